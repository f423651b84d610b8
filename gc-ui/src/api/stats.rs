//! Collection statistics

use axum::{
    extract::{Path, State},
    Json,
};
use gc_common::stats::{self, Group};
use gc_common::Field;
use serde::Serialize;

use super::records::RecordView;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct FieldInfo {
    pub key: &'static str,
    pub label: &'static str,
}

impl From<Field> for FieldInfo {
    fn from(field: Field) -> Self {
        Self {
            key: field.key(),
            label: field.label(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total: usize,
    pub categories: Vec<FieldInfo>,
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub label: String,
    pub unspecified: bool,
    pub count: usize,
    pub records: Vec<RecordView>,
}

#[derive(Debug, Serialize)]
pub struct FieldStatsResponse {
    pub field: FieldInfo,
    pub total: usize,
    pub groups: Vec<GroupView>,
}

/// GET /api/stats
pub async fn get_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let store = state.store.read().await;
    let summary = stats::summary(store.records());

    Json(SummaryResponse {
        total: summary.total,
        categories: summary.categories.into_iter().map(FieldInfo::from).collect(),
    })
}

/// GET /api/stats/:field
///
/// `field` is a field key (`car_brand`) or column label (`Marca della macchina`).
pub async fn get_field_stats(
    State(state): State<AppState>,
    Path(field): Path<String>,
) -> ApiResult<Json<FieldStatsResponse>> {
    let field = Field::parse(&field)
        .ok_or_else(|| ApiError::NotFound(format!("unknown field {:?}", field)))?;

    let store = state.store.read().await;
    let groups: Vec<GroupView> = stats::group_by(store.records(), field)
        .into_iter()
        .map(|group: Group<'_>| GroupView {
            label: group.label,
            unspecified: group.unspecified,
            count: group.count,
            records: group
                .records
                .into_iter()
                .map(|r| RecordView::new(r, &state.placeholders))
                .collect(),
        })
        .collect();

    Ok(Json(FieldStatsResponse {
        field: field.into(),
        total: store.len(),
        groups,
    }))
}
