use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "actor")]
pub struct Model {
    /// Preferred user name
    #[sea_orm(primary_key, auto_increment = false)]
    pub pun: String,

    /// RSA public key, SPKI PEM
    #[sea_orm(column_type = "Text")]
    pub public_key_pem: String,

    /// RSA private key, PKCS#8 DER
    pub private_key: Vec<u8>,

    pub created: DateTimeUtc,

    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::login_actor_link::Entity")]
    LoginActorLink,
}

impl Related<super::login_actor_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoginActorLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
