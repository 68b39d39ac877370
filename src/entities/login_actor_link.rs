use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login_actor_link")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub login_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub pun: String,

    pub owner: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::login::Entity",
        from = "Column::LoginId",
        to = "super::login::Column::Id"
    )]
    Login,

    #[sea_orm(
        belongs_to = "super::actor::Entity",
        from = "Column::Pun",
        to = "super::actor::Column::Pun"
    )]
    Actor,
}

impl Related<super::login::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Login.def()
    }
}

impl Related<super::actor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
