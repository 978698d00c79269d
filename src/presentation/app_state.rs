// Application state for HTTP handlers
use crate::application::sensor_service::SensorService;
use crate::presentation::presenter::Presenter;

#[derive(Clone)]
pub struct AppState {
    pub sensor_service: SensorService,
    pub presenter: Presenter,
}
