//! Debt and investment instruments: loans a company owes, bonds it holds.

use serde::{Deserialize, Serialize};

/// Amortizing loan. Rates are annual, payments are scheduled monthly and
/// settled in quarterly batches of three.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Outstanding principal in USD.
    pub principal: f64,
    /// Annual interest rate, e.g. 0.09.
    pub annual_rate: f64,
    /// Months left on the schedule; may go non-positive just before removal.
    pub term_remaining_months: i32,
    /// Fixed monthly payment computed at origination.
    pub monthly_payment: f64,
}

impl Loan {
    pub fn new(principal: f64, annual_rate: f64, term_months: i32) -> Self {
        Self {
            principal,
            annual_rate,
            term_remaining_months: term_months,
            monthly_payment: Self::scheduled_payment(principal, annual_rate, term_months),
        }
    }

    /// Standard annuity payment `P * r / (1 - (1 + r)^-n)` with `r` the
    /// monthly rate. A zero rate spreads principal evenly; `n <= 0` pays nothing.
    pub fn scheduled_payment(principal: f64, annual_rate: f64, term_months: i32) -> f64 {
        if term_months <= 0 {
            return 0.0;
        }
        let r = annual_rate / 12.0;
        if r == 0.0 {
            return principal / f64::from(term_months);
        }
        principal * r / (1.0 - (1.0 + r).powi(-term_months))
    }

    pub fn monthly_interest(&self) -> f64 {
        self.principal * self.annual_rate / 12.0
    }

    /// Scheduled debt service for one quarter.
    pub fn quarterly_payment(&self) -> f64 {
        self.monthly_payment * 3.0
    }

    /// One month of full scheduled payment. Returns the cash paid.
    pub fn apply_monthly_payment(&mut self) -> f64 {
        let toward_principal = (self.monthly_payment - self.monthly_interest()).max(0.0);
        self.principal = (self.principal - toward_principal).max(0.0);
        self.term_remaining_months -= 1;
        self.monthly_payment
    }

    /// Quarterly batch: interest is evaluated on the opening principal, the
    /// principal portion is tripled. Returns the cash outflow for the quarter.
    pub fn amortize_quarter(&mut self) -> f64 {
        let toward_principal = (self.monthly_payment - self.monthly_interest()).max(0.0) * 3.0;
        self.principal = (self.principal - toward_principal).max(0.0);
        self.term_remaining_months -= 3;
        self.quarterly_payment()
    }

    pub fn is_settled(&self) -> bool {
        self.term_remaining_months <= 0 || self.principal <= 0.0
    }
}

/// Fixed-term bond held as an investment. Interest is paid out every
/// quarter, principal comes back at maturity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub principal: f64,
    pub annual_rate: f64,
    /// Quarters until maturity.
    pub term_remaining: u32,
    pub original_term: u32,
}

/// Cash produced by one quarterly bond settlement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BondSettlement {
    pub interest: f64,
    /// Principal repaid; zero unless the bond matured this quarter.
    pub principal_returned: f64,
    pub matured: bool,
}

impl BondSettlement {
    pub fn cash(&self) -> f64 {
        self.interest + self.principal_returned
    }
}

impl Bond {
    pub fn new(principal: f64, annual_rate: f64, term_quarters: u32) -> Self {
        Self {
            principal,
            annual_rate,
            term_remaining: term_quarters,
            original_term: term_quarters,
        }
    }

    pub fn quarterly_interest(&self) -> f64 {
        self.principal * self.annual_rate / 4.0
    }

    /// Pay one quarter of interest and count down the term.
    pub fn settle_quarter(&mut self) -> BondSettlement {
        let interest = self.quarterly_interest();
        self.term_remaining = self.term_remaining.saturating_sub(1);
        let matured = self.term_remaining == 0;
        BondSettlement {
            interest,
            principal_returned: if matured { self.principal } else { 0.0 },
            matured,
        }
    }
}
