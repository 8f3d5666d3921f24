//! Riders: users, drivers, passengers, and seat capacity.
//!
//! Value types validate on construction so services only ever handle
//! well-formed locations, windows, and party sizes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Which side of a ride a connected user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns a road and decides on proposals.
    Driver,
    /// Requests a seat on a driver's road.
    Passenger,
}

impl Role {
    /// Lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Passenger => "passenger",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RiderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" => Ok(Self::Driver),
            "passenger" => Ok(Self::Passenger),
            other => Err(RiderValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Validation errors for rider value types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiderValidationError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    /// Longitude outside [-180, 180] or not finite.
    #[error("longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
    /// Window start is not strictly before its end.
    #[error("departure window must start before it ends")]
    EmptyWindow,
    /// Party size of zero.
    #[error("number of people must be at least 1")]
    EmptyParty,
    /// Driver offering no seats.
    #[error("number of available seats must be at least 1")]
    NoSeats,
    /// Blank user name.
    #[error("name must not be empty")]
    EmptyName,
    /// Email without a local part and domain.
    #[error("email must look like local@domain")]
    InvalidEmail,
    /// Unrecognised role string.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    /// Validate and construct a coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, RiderValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(RiderValidationError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(RiderValidationError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance in metres (haversine).
    pub fn distance_m(&self, other: &Location) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Inclusive departure window; `earliest` is strictly before `latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureWindow {
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
}

impl DepartureWindow {
    pub fn new(earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Result<Self, RiderValidationError> {
        if earliest >= latest {
            return Err(RiderValidationError::EmptyWindow);
        }
        Ok(Self { earliest, latest })
    }

    pub fn earliest(&self) -> DateTime<Utc> {
        self.earliest
    }

    pub fn latest(&self) -> DateTime<Utc> {
        self.latest
    }

    /// Whether the two windows share at least one instant.
    pub fn overlaps(&self, other: &DepartureWindow) -> bool {
        self.earliest <= other.latest && other.earliest <= self.latest
    }
}

/// Number of people travelling together; at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PartySize(u32);

impl PartySize {
    pub fn new(size: u32) -> Result<Self, RiderValidationError> {
        if size == 0 {
            return Err(RiderValidationError::EmptyParty);
        }
        Ok(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PartySize {
    type Error = RiderValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartySize> for u32 {
    fn from(value: PartySize) -> Self {
        value.0
    }
}

/// Rejected capacity changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapacityError {
    /// Reservation larger than the free slots.
    #[error("not enough free seats: requested {requested}, available {available}")]
    Exhausted { requested: u32, available: u32 },
    /// Release that would push free slots above the seat total.
    #[error("release of {released} would exceed {total_seats} total seats")]
    OverRelease { released: u32, total_seats: u32 },
    /// Resize below the seats already committed to passengers.
    #[error("exceeds capacity: {committed} seats are committed, cannot resize to {requested_total}")]
    BelowCommitted { requested_total: u32, committed: u32 },
    /// Resize to zero seats.
    #[error("number of possible passengers must be at least 1")]
    ZeroSeats,
}

/// A single atomic change to a driver's seat accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDelta {
    /// Take slots for a pending passenger party.
    Reserve(PartySize),
    /// Return slots after a rejection.
    Release(PartySize),
    /// Change the seat total; free slots move by the same amount.
    Resize(u32),
}

/// Driver seat accounting.
///
/// ## Invariants
/// - `available_slots <= total_seats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatCapacity {
    total_seats: u32,
    available_slots: u32,
}

impl SeatCapacity {
    /// Fresh capacity with every seat free.
    pub fn new(total_seats: u32) -> Result<Self, RiderValidationError> {
        if total_seats == 0 {
            return Err(RiderValidationError::NoSeats);
        }
        Ok(Self {
            total_seats,
            available_slots: total_seats,
        })
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn available_slots(&self) -> u32 {
        self.available_slots
    }

    /// Seats held by accepted or pending passengers.
    pub fn committed(&self) -> u32 {
        self.total_seats - self.available_slots
    }

    /// Apply a delta, returning the new accounting or the rule it broke.
    ///
    /// # Examples
    /// ```
    /// use ridematch::domain::{PartySize, SeatCapacity, SlotDelta};
    ///
    /// let seats = SeatCapacity::new(4).expect("seats");
    /// let party = PartySize::new(2).expect("party");
    /// let after = seats.apply(SlotDelta::Reserve(party)).expect("fits");
    /// assert_eq!(after.available_slots(), 2);
    /// ```
    pub fn apply(self, delta: SlotDelta) -> Result<Self, CapacityError> {
        match delta {
            SlotDelta::Reserve(party) => {
                let requested = party.get();
                let available_slots = self.available_slots.checked_sub(requested).ok_or(
                    CapacityError::Exhausted {
                        requested,
                        available: self.available_slots,
                    },
                )?;
                Ok(Self {
                    available_slots,
                    ..self
                })
            }
            SlotDelta::Release(party) => {
                let released = party.get();
                let available_slots = self
                    .available_slots
                    .checked_add(released)
                    .filter(|slots| *slots <= self.total_seats)
                    .ok_or(CapacityError::OverRelease {
                        released,
                        total_seats: self.total_seats,
                    })?;
                Ok(Self {
                    available_slots,
                    ..self
                })
            }
            SlotDelta::Resize(requested_total) => {
                if requested_total == 0 {
                    return Err(CapacityError::ZeroSeats);
                }
                let committed = self.committed();
                if requested_total < committed {
                    return Err(CapacityError::BelowCommitted {
                        requested_total,
                        committed,
                    });
                }
                Ok(Self {
                    total_seats: requested_total,
                    available_slots: requested_total - committed,
                })
            }
        }
    }
}

/// Registered user with contact details used in notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    id: UserId,
    name: String,
    email: String,
}

impl UserProfile {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, RiderValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(RiderValidationError::EmptyName);
        }
        let email = email.into().trim().to_owned();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(RiderValidationError::InvalidEmail),
        }
        Ok(Self { id, name, email })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// A driver offering seats along a road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub user_id: UserId,
    pub location: Location,
    pub destination: Location,
    pub departure: DepartureWindow,
    pub capacity: SeatCapacity,
}

/// A passenger party waiting to be picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub user_id: UserId,
    pub location: Location,
    pub party_size: PartySize,
    pub departure: DepartureWindow,
}
