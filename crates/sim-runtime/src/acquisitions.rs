//! Settlement of acquisitions agreed in an earlier quarter.

use sim_ai::actions::money;
use sim_core::{MergeSummary, PendingAcquisition, World};
use sim_econ::has_breakout_growth;
use tracing::info;

#[derive(Clone, Debug, PartialEq)]
pub enum AcquisitionResolution {
    Completed {
        deal: PendingAcquisition,
        summary: MergeSummary,
    },
    TargetGone(PendingAcquisition),
    AcquirerGone(PendingAcquisition),
    InsufficientFunds(PendingAcquisition),
    /// The target had a product growing too fast to be bought.
    BreakoutGrowth(PendingAcquisition),
}

impl AcquisitionResolution {
    pub fn deal(&self) -> &PendingAcquisition {
        match self {
            AcquisitionResolution::Completed { deal, .. }
            | AcquisitionResolution::TargetGone(deal)
            | AcquisitionResolution::AcquirerGone(deal)
            | AcquisitionResolution::InsufficientFunds(deal)
            | AcquisitionResolution::BreakoutGrowth(deal) => deal,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, AcquisitionResolution::Completed { .. })
    }
}

/// Resolve every pending acquisition submitted before the current turn.
///
/// Deals are settled in submission order. A deal fails if the target is
/// gone, if the buyer can no longer pay, or if the target is growing too
/// fast, checked in that order. Failures only produce a competitor-feed
/// line; successes debit the price and merge the target.
pub fn resolve_pending(world: &mut World) -> Vec<AcquisitionResolution> {
    let turn = world.turn;
    let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut world.pending_acquisitions)
        .into_iter()
        .partition(|a| turn > a.turn_submitted);
    world.pending_acquisitions = waiting;

    let mut resolved = Vec::with_capacity(due.len());
    for deal in due {
        let target_exists = world.ai_index(&deal.target).is_some();
        let outcome = match world.company(&deal.acquirer).map(|c| c.cash) {
            _ if !target_exists => AcquisitionResolution::TargetGone(deal),
            None => AcquisitionResolution::AcquirerGone(deal),
            Some(cash) if cash < deal.price => AcquisitionResolution::InsufficientFunds(deal),
            Some(_) if target_breaks_out(world, &deal.target) => {
                AcquisitionResolution::BreakoutGrowth(deal)
            }
            Some(_) => complete(world, deal),
        };
        match &outcome {
            AcquisitionResolution::Completed { deal, .. } => {
                world.news.push(format!(
                    "{} acquired {} for {}!",
                    deal.acquirer,
                    deal.target,
                    money(deal.price)
                ));
                info!(acquirer = %deal.acquirer, target = %deal.target, price = deal.price, "acquisition completed");
            }
            AcquisitionResolution::TargetGone(d) => world
                .competitor_news
                .push(format!("Acquisition of {} failed; no longer exists.", d.target)),
            AcquisitionResolution::AcquirerGone(d) => world
                .competitor_news
                .push(format!("Acquisition of {} failed; buyer no longer exists.", d.target)),
            AcquisitionResolution::InsufficientFunds(d) => world
                .competitor_news
                .push(format!("Acquisition of {} failed; insufficient funds.", d.target)),
            AcquisitionResolution::BreakoutGrowth(d) => world
                .competitor_news
                .push(format!("Acquisition of {} failed; top-2 growth.", d.target)),
        }
        resolved.push(outcome);
    }
    resolved
}

fn target_breaks_out(world: &World, target: &str) -> bool {
    world
        .ai_index(target)
        .map_or(false, |i| has_breakout_growth(&world.ai_companies[i]))
}

fn complete(world: &mut World, deal: PendingAcquisition) -> AcquisitionResolution {
    if let Some(buyer) = world.company_mut(&deal.acquirer) {
        buyer.cash -= deal.price;
    }
    match world.absorb(&deal.acquirer, &deal.target) {
        Some(summary) => AcquisitionResolution::Completed { deal, summary },
        None => {
            // Only reachable if acquirer and target are the same company.
            if let Some(buyer) = world.company_mut(&deal.acquirer) {
                buyer.cash += deal.price;
            }
            AcquisitionResolution::TargetGone(deal)
        }
    }
}
