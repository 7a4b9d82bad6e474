//! `restock`: append parsed credentials to the stock.

use super::{Context, Handler};
use crate::credential::parse;
use crate::error::{Denial, HandlerError, HandlerResult};
use crate::network::protocol::Outcome;
use crate::roles::RoleResolver;
use async_trait::async_trait;
use tracing::info;

pub struct RestockHandler;

#[async_trait]
impl Handler for RestockHandler {
    async fn handle(&self, ctx: &Context<'_>, text: Option<&str>) -> HandlerResult {
        let state = ctx.state;
        let role = &state.roles.restock;

        // Role check comes before argument validation.
        if !ctx.member.is_in_role(&ctx.member.id, role) {
            return Err(Denial::PermissionDenied { role: role.clone() }.into());
        }

        let text = text.ok_or(HandlerError::NeedMoreParams("text"))?;
        let records = parse(text);
        if records.is_empty() {
            return Err(Denial::ParseEmpty.into());
        }

        let added = state.stock.add_many(&records).await?;
        let total = state.stock.count().await?;

        info!(
            user = %ctx.member.id,
            added,
            total,
            "stock replenished"
        );

        Ok(Outcome::Restocked {
            added,
            total,
            restocked_by: ctx.display_name().to_string(),
        })
    }
}
