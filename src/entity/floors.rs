use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "floors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub floor_number: i32,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::restaurant_tables::Entity")]
    RestaurantTables,
}

impl Related<super::restaurant_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RestaurantTables.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
