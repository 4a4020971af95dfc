// Management-zone scoping shared by dashboards and tiles
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("management zone '{name}' has no identifier and cannot be resolved")]
pub struct ScopeResolutionError {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementZone {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFilter {
    pub management_zone: Option<ManagementZone>,
}

impl ScopeFilter {
    pub fn with_zone(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            management_zone: Some(ManagementZone {
                id: id.into(),
                name: name.into(),
            }),
        }
    }

    /// A tile that names its own zone replaces the dashboard scoping entirely;
    /// otherwise the dashboard filter applies unchanged.
    pub fn merge<'a>(dashboard: &'a ScopeFilter, tile: &'a ScopeFilter) -> &'a ScopeFilter {
        if tile.management_zone.is_some() {
            tile
        } else {
            dashboard
        }
    }

    fn zone_id(&self) -> Result<Option<&str>, ScopeResolutionError> {
        match &self.management_zone {
            None => Ok(None),
            Some(zone) if zone.id.trim().is_empty() => Err(ScopeResolutionError {
                name: zone.name.clone(),
            }),
            Some(zone) => Ok(Some(zone.id.trim())),
        }
    }

    /// Suffix appended to `problemSelector` / `securityProblemSelector`.
    pub fn problem_selector_suffix(&self) -> Result<String, ScopeResolutionError> {
        Ok(self
            .zone_id()?
            .map(|id| format!(",managementZoneIds({})", id))
            .unwrap_or_default())
    }

    /// Suffix appended to an `entitySelector`.
    pub fn entity_selector_suffix(&self) -> Result<String, ScopeResolutionError> {
        Ok(self
            .zone_id()?
            .map(|id| format!(",mzId({})", id))
            .unwrap_or_default())
    }

    /// Value for the metrics API `mzSelector` parameter.
    pub fn mz_selector(&self) -> Result<Option<String>, ScopeResolutionError> {
        Ok(self.zone_id()?.map(|id| format!("mzId({})", id)))
    }
}
