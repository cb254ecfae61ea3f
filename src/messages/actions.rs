use bevy::prelude::*;

use crate::actions::ActionContext;

/// Input collaborators ask for an action by its catalog key. Requests are
/// validated when read and executed one tick later.
#[derive(Message, Debug, Clone)]
pub struct ActionRequest {
    pub key: String,
    pub context: ActionContext,
}

impl ActionRequest {
    pub fn new(key: impl Into<String>, context: ActionContext) -> Self {
        Self {
            key: key.into(),
            context,
        }
    }
}
