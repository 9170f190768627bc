pub mod extract;
pub mod interceptor;
pub mod plugin;

pub use extract::{CapturedRequest, CapturedResponse, ErrorDetail, RestExtractor};
pub use interceptor::Interceptor;
pub use plugin::{InFlight, RestInterceptor};
