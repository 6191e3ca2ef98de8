use std::sync::Arc;

use crate::recorder::Recorder;
use crate::relay::RelayClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub relay: RelayClient,
    pub recorder: Option<Recorder>,
}
