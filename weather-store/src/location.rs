use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Source of the device position used when no place name is given.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn request_permission(&self) -> Result<Permission, LocationError>;

    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Geolocator backed by a configured "home" position.
///
/// Hosts without a positioning service use this in place of a GPS fix: access is
/// granted when coordinates are configured and denied otherwise.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn request_permission(&self) -> Result<Permission, LocationError> {
        Ok(match self.position {
            Some(_) => Permission::Granted,
            None => Permission::Denied,
        })
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.position.ok_or(LocationError::NoFix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_geolocator_grants_when_configured() {
        let geo = FixedGeolocator::new(Some(Coordinates::new(6.52, 3.37)));

        assert_eq!(geo.request_permission().await.unwrap(), Permission::Granted);
        assert_eq!(geo.current_position().await.unwrap(), Coordinates::new(6.52, 3.37));
    }

    #[tokio::test]
    async fn fixed_geolocator_denies_without_position() {
        let geo = FixedGeolocator::default();

        assert_eq!(geo.request_permission().await.unwrap(), Permission::Denied);
        assert!(matches!(geo.current_position().await, Err(LocationError::NoFix)));
    }
}
