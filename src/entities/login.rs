use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "login")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Argon2id PHC string
    pub password: String,

    pub enabled: bool,

    pub created: DateTimeUtc,

    /// Open document: email, roles, lastSuccessfulLogin, lastFailedLogin
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::login_actor_link::Entity")]
    LoginActorLink,

    #[sea_orm(has_many = "super::login_token::Entity")]
    LoginToken,
}

impl Related<super::login_actor_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoginActorLink.def()
    }
}

impl Related<super::login_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoginToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
