//! `SeaORM` Entity for fiscal_years table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_years")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub closed: bool,
    pub closed_by: Option<Uuid>,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for tallybook_core::fiscal::FiscalYear {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id,
            start_date: model.start_date,
            end_date: model.end_date,
            closed: model.closed,
        }
    }
}
