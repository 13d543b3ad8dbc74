pub mod forecast;
pub mod openweather;
pub mod refresh;
pub mod snapshot;
