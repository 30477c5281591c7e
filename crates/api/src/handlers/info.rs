//! Platform-wide read models: landing page counters and the map feed.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use commonground_core::project::{ProjectCategory, ProjectStatus};
use commonground_db::models::project::Project;
use commonground_db::repositories::{IdeaRepo, ProjectRepo};
use serde::Serialize;

use crate::config::MapConfig;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Map center used when no project has coordinates (Zurich).
pub const DEFAULT_MAP_CENTER: MapPoint = MapPoint {
    latitude: 47.3769,
    longitude: 8.5417,
};

#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub total_ideas: i64,
    pub completed_projects: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Tile provider settings. `available` is false when no access token is
/// configured; the widget then shows its fallback.
#[derive(Debug, Serialize)]
pub struct MapTiles {
    pub available: bool,
    pub access_token: Option<String>,
    pub style_url: String,
}

#[derive(Debug, Serialize)]
pub struct MapMarker {
    pub reference: String,
    pub title: String,
    pub short_description: String,
    pub category: ProjectCategory,
    pub image: String,
    pub status: ProjectStatus,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct MapFeed {
    pub tiles: MapTiles,
    pub center: MapPoint,
    pub markers: Vec<MapMarker>,
}

fn map_tiles(config: &MapConfig) -> MapTiles {
    MapTiles {
        available: config.tiles_api_key.is_some(),
        access_token: config.tiles_api_key.clone(),
        style_url: config.style_url.clone(),
    }
}

fn markers(projects: Vec<Project>) -> Vec<MapMarker> {
    let now = Utc::now();
    projects
        .into_iter()
        .filter_map(|project| {
            let (latitude, longitude) = (project.latitude?, project.longitude?);
            Some(MapMarker {
                status: project.status(now),
                reference: project.reference,
                title: project.title,
                short_description: project.short_description,
                category: project.category,
                image: project.image,
                latitude,
                longitude,
            })
        })
        .collect()
}

/// Mean position of the markers.
fn center_of(markers: &[MapMarker]) -> MapPoint {
    if markers.is_empty() {
        return DEFAULT_MAP_CENTER;
    }
    let n = markers.len() as f64;
    MapPoint {
        latitude: markers.iter().map(|m| m.latitude).sum::<f64>() / n,
        longitude: markers.iter().map(|m| m.longitude).sum::<f64>() / n,
    }
}

/// GET /api/v1/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<DataResponse<PlatformStats>>> {
    let total_ideas = IdeaRepo::count_all(&state.pool).await?;
    let completed_projects = ProjectRepo::count_completed(&state.pool, Utc::now()).await?;
    Ok(Json(DataResponse {
        data: PlatformStats {
            total_ideas,
            completed_projects,
        },
    }))
}

/// GET /api/v1/map
pub async fn map(State(state): State<AppState>) -> AppResult<Json<DataResponse<MapFeed>>> {
    let markers = markers(ProjectRepo::list_located(&state.pool).await?);
    Ok(Json(DataResponse {
        data: MapFeed {
            tiles: map_tiles(&state.config.map),
            center: center_of(&markers),
            markers,
        },
    }))
}
