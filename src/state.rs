use std::sync::Arc;

use surrealdb::{
    Surreal,
    engine::remote::ws::{Client, Ws},
    opt::auth::Root,
};

use crate::config::Config;
use crate::errors::Result;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub sdb: Surreal<Client>,
    pub mailer: Mailer,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn init(config: Config) -> Result<Self> {
        let sdb = Surreal::new::<Ws>(config.db_addr.as_str()).await?;
        sdb.signin(Root {
            username: &config.db_user,
            password: &config.db_pass,
        })
        .await?;
        sdb.use_ns(&config.db_namespace)
            .use_db(&config.db_name)
            .await?;

        let mailer = Mailer::from_config(&config)?;

        Ok(Self {
            sdb,
            mailer,
            config: Arc::new(config),
        })
    }
}
