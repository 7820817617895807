use crate::{actions::{Actions, Selector},
            artifacts::{ArtifactStore, RESERVATION_ARTIFACT},
            error::{PilotError, Result},
            pilot::steps::{run_steps, Step}};
use serde::{Deserialize, Serialize};

/// Discount value recorded when it could not be read
pub const DISCOUNT_UNAVAILABLE: &str = "unavailable";

/// Status recorded once the phone number has been entered
pub const STATUS_PHONE_ENTERED: &str = "phone_entered";

pub const DEFAULT_PHONE: &str = "0501234567";

/// Summary of one reservation attempt, persisted as `final_reservation.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub url: String,
    pub status: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_night_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_subtotal: Option<String>,
    pub discount: String,
    pub service_fee: String,
    pub total: String,
}

#[derive(Debug, Clone)]
pub struct ReservationSelectors {
    /// Step appended to the ranked card to reach its link
    pub card_link_step: String,
    pub login_dismiss: Selector,
    pub reserve: Selector,
    pub country_code: Selector,
    /// Text of the country entry, matched exactly
    pub country_label: String,
    pub phone_input: Selector,
    pub price_per_night: Selector,
    pub price_subtotal: Selector,
    pub discount: Selector,
    pub service_fee: Selector,
    pub total: Selector,
}

impl Default for ReservationSelectors {
    fn default() -> Self {
        Self {
            card_link_step: "//a".to_string(),
            login_dismiss: Selector::css("div[role='dialog'] button[aria-label='Close']"),
            reserve: Selector::xpath("//button[normalize-space(.)='Reserve']"),
            country_code: Selector::css("[data-testid='login-signup-countrycode']"),
            country_label: "Israel (+972)".to_string(),
            phone_input: Selector::css("input[type='tel']"),
            price_per_night: Selector::xpath("//div[@data-testid='price-item-ACCOMMODATION']//span[1]"),
            price_subtotal: Selector::xpath("//div[@data-testid='price-item-ACCOMMODATION']//span[last()]"),
            discount: Selector::xpath("//div[starts-with(@data-testid,'price-item-DISCOUNT')]//span[last()]"),
            service_fee: Selector::xpath("//div[@data-testid='price-item-AIRBNB_GUEST_FEE']//span[last()]"),
            total: Selector::xpath("//div[@data-testid='price-item-total']//span[last()]"),
        }
    }
}

/// Mutable state threaded through the reservation steps
struct ReservationContext {
    page: Box<dyn Actions>,
    price_per_night_block: Option<String>,
    price_subtotal: Option<String>,
    discount: String,
    service_fee: Option<String>,
    total: Option<String>,
}

impl ReservationContext {
    fn new(page: Box<dyn Actions>) -> Self {
        Self {
            page,
            price_per_night_block: None,
            price_subtotal: None,
            discount: DISCOUNT_UNAVAILABLE.to_string(),
            service_fee: None,
            total: None,
        }
    }

    fn read(&self, selector: &Selector) -> Result<String> {
        Ok(self.page.read_text(selector)?.trim().to_string())
    }

    fn into_summary(self, phone: &str) -> Result<ReservationSummary> {
        let missing = |field: &str| PilotError::MandatoryReservationStepFailed {
            step: field.to_string(),
            source: Box::new(PilotError::DriverFailed { action: field.to_string(), reason: "not captured".to_string() }),
        };

        Ok(ReservationSummary {
            url: self.page.current_url()?,
            status: STATUS_PHONE_ENTERED.to_string(),
            phone: phone.to_string(),
            price_per_night_block: self.price_per_night_block,
            price_subtotal: self.price_subtotal,
            discount: self.discount,
            service_fee: self.service_fee.ok_or_else(|| missing("service_fee"))?,
            total: self.total.ok_or_else(|| missing("total"))?,
        })
    }
}

/// Opens a ranked listing in a new tab and walks it up to the payment details
pub struct ReservationFlow<'a> {
    actions: &'a dyn Actions,
    cards: Selector,
    selectors: ReservationSelectors,
}

impl<'a> ReservationFlow<'a> {
    /// `cards` must be the selector the listing was ranked from
    pub fn new(actions: &'a dyn Actions, cards: Selector) -> Self {
        Self::with_selectors(actions, cards, ReservationSelectors::default())
    }

    pub fn with_selectors(actions: &'a dyn Actions, cards: Selector, selectors: ReservationSelectors) -> Self {
        Self { actions, cards, selectors }
    }

    /// Link inside the card at 0-based `index`; the UI addresses cards 1-based
    pub fn card_trigger(&self, index: usize) -> Result<Selector> {
        self.cards.nth(index + 1)?.descendant(&self.selectors.card_link_step)
    }

    pub fn attempt(&self, index: usize, phone: Option<&str>) -> Result<ReservationSummary> {
        let phone = phone.unwrap_or(DEFAULT_PHONE);

        let trigger = self.card_trigger(index)?;
        log::info!("Opening listing #{} via {}", index, trigger);
        let page = self.actions.open_secondary_context(&trigger)?;

        let sel = &self.selectors;
        let mut context = ReservationContext::new(page);

        let steps: Vec<Step<'_, ReservationContext>> = vec![
            Step::best_effort("dismiss_login", |ctx: &mut ReservationContext| {
                if ctx.page.is_visible(&sel.login_dismiss) {
                    ctx.page.click(&sel.login_dismiss)?;
                }
                Ok(())
            }),
            Step::mandatory("reserve", |ctx: &mut ReservationContext| ctx.page.click(&sel.reserve)),
            Step::best_effort("country_code", |ctx: &mut ReservationContext| {
                if ctx.page.is_visible(&sel.country_code) {
                    ctx.page.click(&sel.country_code)?;
                    ctx.page.click(&Selector::exact_text(&sel.country_label))?;
                }
                Ok(())
            }),
            Step::mandatory("phone", move |ctx: &mut ReservationContext| ctx.page.fill(&sel.phone_input, phone)),
            // Per-night block and subtotal are captured together or not at all
            Step::best_effort("price_breakdown", |ctx: &mut ReservationContext| {
                let per_night = ctx.read(&sel.price_per_night)?;
                let subtotal = ctx.read(&sel.price_subtotal)?;
                ctx.price_per_night_block = Some(per_night);
                ctx.price_subtotal = Some(subtotal);
                Ok(())
            })
            .or_else(|ctx: &mut ReservationContext| {
                ctx.price_per_night_block = None;
                ctx.price_subtotal = None;
                ctx.discount = DISCOUNT_UNAVAILABLE.to_string();
            }),
            Step::best_effort("discount", |ctx: &mut ReservationContext| {
                if ctx.price_subtotal.is_some() {
                    ctx.discount = ctx.read(&sel.discount)?;
                }
                Ok(())
            })
            .or_else(|ctx: &mut ReservationContext| ctx.discount = DISCOUNT_UNAVAILABLE.to_string()),
            Step::mandatory("service_fee", |ctx: &mut ReservationContext| {
                ctx.service_fee = Some(ctx.read(&sel.service_fee)?);
                Ok(())
            }),
            Step::mandatory("total", |ctx: &mut ReservationContext| {
                ctx.total = Some(ctx.read(&sel.total)?);
                Ok(())
            }),
        ];

        let reports = run_steps(steps, &mut context)?;
        let skipped: Vec<&str> = reports.iter().filter(|r| !r.succeeded()).map(|r| r.name).collect();
        if !skipped.is_empty() {
            log::info!("Reservation continued past optional steps: {}", skipped.join(", "));
        }

        context.into_summary(phone)
    }

    /// Attempt the reservation and persist the summary
    pub fn attempt_and_save(&self, index: usize, phone: Option<&str>, store: &ArtifactStore) -> Result<ReservationSummary> {
        let summary = self.attempt(index, phone)?;
        store.write_json(RESERVATION_ARTIFACT, &summary)?;
        Ok(summary)
    }
}
