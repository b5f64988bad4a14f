pub mod appointment;
pub mod day;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use day::{DateStatus, DayRecord, SlotId};
