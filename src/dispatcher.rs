//! Intent dispatch pipeline
//!
//! One request at a time: query the chat service, validate the payload into
//! an intent, execute it, record the outcome, format the reply. Failures
//! from any stage collapse into outcome text at this boundary, every request
//! is recorded whether it succeeded or not, and the loop above never sees an
//! unhandled error.

use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::actions::ActionRunner;
use crate::chat::ChatCompletionClient;
use crate::error::Result;
use crate::intent::Intent;
use crate::memory::InteractionMemory;
use crate::personality::PersonalityFormatter;

/// Owns exactly the collaborators one request cycle needs.
pub struct IntentDispatcher {
    chat: Arc<dyn ChatCompletionClient>,
    actions: Box<dyn ActionRunner>,
    memory: InteractionMemory,
    formatter: PersonalityFormatter,
}

impl IntentDispatcher {
    pub fn new(
        chat: Arc<dyn ChatCompletionClient>,
        actions: Box<dyn ActionRunner>,
        memory: InteractionMemory,
        formatter: PersonalityFormatter,
    ) -> Self {
        Self {
            chat,
            actions,
            memory,
            formatter,
        }
    }

    /// Run one full request cycle, always yielding a printable reply.
    pub async fn handle(&mut self, input: &str) -> String {
        let request_id = Uuid::new_v4();

        let outcome = match self.process(request_id, input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%request_id, error = %e, "request failed");
                e.to_string()
            }
        };

        // Recorded regardless of success; a failed append must not cost the reply.
        if let Err(e) = self.memory.record(input, &outcome) {
            warn!(%request_id, error = %e, "cannot record interaction");
        }

        match self.formatter.format(&outcome) {
            Ok(reply) => reply,
            Err(e) => {
                error!(%request_id, error = %e, "formatter failed, replying with raw outcome");
                outcome
            }
        }
    }

    async fn process(&self, request_id: Uuid, input: &str) -> Result<String> {
        debug!(%request_id, chat = %self.chat.name(), "querying completion");
        let raw = self.chat.complete(input).await?;

        debug!(%request_id, "validating payload");
        let intent = Intent::parse(&raw)?;

        debug!(%request_id, intent = %intent.name(), "executing");
        Ok(self.actions.run(&intent).await)
    }
}
