pub mod flight;
pub mod passenger;

pub use flight::{Flight, FlightStatus, StatusChange};
pub use passenger::{Passenger, PassengerCategory};
