use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "etl_run")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub status: String,
    pub rows_processed: i32,
    pub rows_loaded: i32,
    pub rows_quarantined: i32,
    pub dimensions_inserted: i32,
    pub dimensions_updated: i32,
    pub dimensions_unchanged: i32,
    pub abort_cause: Option<String>,
    pub started_at: DateTime,
    pub finished_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::etl_quarantine::Entity")]
    EtlQuarantine,
}

impl Related<super::etl_quarantine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EtlQuarantine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
