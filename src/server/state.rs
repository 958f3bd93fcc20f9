use crate::location::LocationPipeline;
use crate::registry::RegistrantStore;

pub struct AppState {
    pub pipeline: LocationPipeline,
    pub store: Box<dyn RegistrantStore>,
}
