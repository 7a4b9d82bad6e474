//! `stock`: report how many accounts are left.

use super::{Context, Handler};
use crate::error::HandlerResult;
use crate::network::protocol::Outcome;
use crate::roles::RoleResolver;
use async_trait::async_trait;

pub struct StockHandler;

#[async_trait]
impl Handler for StockHandler {
    async fn handle(&self, ctx: &Context<'_>, _text: Option<&str>) -> HandlerResult {
        let state = ctx.state;
        let count = state.stock.count().await?;
        let can_restock = count == 0 && ctx.member.is_in_role(&ctx.member.id, &state.roles.restock);

        Ok(Outcome::StockCount { count, can_restock })
    }
}
