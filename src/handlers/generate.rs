//! `generate`: hand out one account, subject to the quota gates.

use super::{Context, Handler};
use crate::error::{Denial, HandlerResult};
use crate::network::protocol::Outcome;
use crate::quota::Tier;
use crate::stock::random;
use async_trait::async_trait;
use tracing::{info, warn};

pub struct GenerateHandler;

#[async_trait]
impl Handler for GenerateHandler {
    async fn handle(&self, ctx: &Context<'_>, _text: Option<&str>) -> HandlerResult {
        let state = ctx.state;
        let user_id = ctx.member.id.as_str();
        let tier = Tier::resolve(ctx.member, user_id, &state.roles.premium);

        state.quota.admit(user_id, tier)?;

        let (record, fallback) = match state.stock.take_one().await {
            Ok(Some(record)) => (record, false),
            Ok(None) if state.random_fallback => {
                crate::metrics::record_generated();
                (random::generate(), true)
            }
            Ok(None) => {
                state.quota.refund(user_id);
                return Err(Denial::StockEmpty.into());
            }
            Err(e) => {
                state.quota.refund(user_id);
                return Err(e.into());
            }
        };

        let (used, daily_limit) = state.quota.usage(user_id, tier);
        let stock_remaining = match state.stock.count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "could not count remaining stock");
                0
            }
        };

        info!(
            user = %user_id,
            ?tier,
            fallback,
            remaining_today = daily_limit.saturating_sub(used),
            "account generated"
        );

        Ok(Outcome::Generated {
            combo: record.combo(),
            username: record.username,
            password: record.password,
            tier,
            remaining_today: daily_limit.saturating_sub(used),
            daily_limit,
            stock_remaining,
            cooldown_secs: state.quota.limit_for(tier).cooldown_secs,
            fallback,
        })
    }
}
