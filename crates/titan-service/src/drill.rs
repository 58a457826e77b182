//! Allocation drill: found a hub, commission units and try to house them
//! all, reporting which were turned away.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::ServiceContext;
use crate::error::{ServiceError, ServiceResult};
use crate::usecases::{CreateHubInput, CreateUnitInput};
use titan_domain::{ErrorKind, Hub, HubView};

/// What to set up for a drill
#[derive(Debug, Clone)]
pub struct DrillPlan {
    pub hub_name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u32,
    pub units: u32,
}

/// Outcome of a drill
#[derive(Debug, Clone, Serialize)]
pub struct DrillReport {
    pub hub: HubView,
    pub allocated: Vec<Uuid>,
    pub rejected: Vec<Uuid>,
}

/// Run the drill end to end against `ctx`.
///
/// Overflow allocations are expected and land in
/// [`DrillReport::rejected`]; any other failure aborts the drill.
pub async fn run_drill(ctx: &ServiceContext, plan: &DrillPlan) -> ServiceResult<DrillReport> {
    let hubs = ctx.hub_service();
    let units = ctx.unit_service();

    let hub = hubs
        .create_hub(CreateHubInput {
            name: plan.hub_name.clone(),
            city: plan.city.clone(),
            country: plan.country.clone(),
            latitude: plan.latitude,
            longitude: plan.longitude,
            total_capacity: plan.capacity,
            commander: None,
            established_date: None,
        })
        .await?;
    let hub_id = hub_id(&hub)?;
    hubs.activate_hub(hub_id).await?;

    let mut allocated = Vec::new();
    let mut rejected = Vec::new();

    for n in 1..=plan.units {
        let unit = units
            .create_unit(CreateUnitInput {
                name: format!("Drill Unit {n:02}"),
                mark: mark_for(n),
                height: 80.0,
                weight: 2_000.0,
                power_core: "Standard Reactor".to_string(),
                weapons: vec!["Plasma Cannon".to_string()],
                base_location: plan.city.clone(),
            })
            .await?;
        let Some(unit_id) = unit.id() else {
            continue;
        };

        match hubs.allocate_unit(hub_id, unit_id).await {
            Ok(_) => allocated.push(unit_id),
            Err(e) if e.domain_kind() == Some(ErrorKind::Capacity) => {
                warn!(unit_id = %unit_id, error = %e, "Drill allocation rejected");
                rejected.push(unit_id);
            }
            Err(e) => return Err(e),
        }
    }

    let hub = hubs.get_hub(hub_id).await?;
    info!(
        hub_id = %hub_id,
        allocated = allocated.len(),
        rejected = rejected.len(),
        "Drill complete"
    );

    Ok(DrillReport {
        hub: HubView::from(&hub),
        allocated,
        rejected,
    })
}

fn hub_id(hub: &Hub) -> ServiceResult<Uuid> {
    hub.id()
        .ok_or_else(|| ServiceError::not_found("Hub", hub.name()))
}

/// Cycle through marks 1..=7
fn mark_for(n: u32) -> u8 {
    u8::try_from((n - 1) % 7 + 1).unwrap_or(1)
}
