//! `format`: explicitly reformat a credential template.

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::network::protocol::Outcome;
use async_trait::async_trait;
use tracing::debug;

pub struct FormatHandler;

#[async_trait]
impl Handler for FormatHandler {
    async fn handle(&self, ctx: &Context<'_>, text: Option<&str>) -> HandlerResult {
        let text = text.ok_or(HandlerError::NeedMoreParams("text"))?;

        match ctx.state.detector.detect(text) {
            Some(found) => {
                crate::metrics::record_formatted();
                Ok(Outcome::Formatted {
                    text: found.to_string(),
                    delete_original: false,
                })
            }
            None => {
                debug!(event = %ctx.event_id, "format requested but nothing matched");
                Ok(Outcome::FormatFailed)
            }
        }
    }
}
