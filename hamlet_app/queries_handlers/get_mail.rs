use hamlet_game::models::inbox::MailMessage;
use hamlet_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{QueryHandler, queries::GetMail},
    uow::UnitOfWork,
};

pub struct GetMailHandler {}

impl GetMailHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl QueryHandler<GetMail> for GetMailHandler {
    async fn handle(
        &self,
        query: GetMail,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &std::sync::Arc<Config>,
    ) -> Result<Vec<MailMessage>, ApplicationError> {
        uow.inbox().list_mail(query.player_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    use hamlet_game::test_utils::{MailFactoryOptions, mail_factory};
    use hamlet_types::Result;

    use super::*;
    use crate::test_utils::tests::MockUnitOfWork;

    #[tokio::test]
    async fn test_mail_is_newest_first() -> Result<()> {
        let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let player_id = Uuid::new_v4();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let old = mail_factory(MailFactoryOptions {
            subject: Some("old".to_string()),
            received_at: Some(t0),
            ..Default::default()
        });
        let new = mail_factory(MailFactoryOptions {
            subject: Some("new".to_string()),
            received_at: Some(t0 + Duration::minutes(5)),
            ..Default::default()
        });
        uow.inbox().add_mail(player_id, &old).await?;
        uow.inbox().add_mail(player_id, &new).await?;

        let mail = GetMailHandler::new()
            .handle(GetMail { player_id }, &uow, &Arc::new(Config::from_env()))
            .await?;
        let subjects: Vec<&str> = mail.iter().map(|m| m.subject.as_str()).collect();
        assert_eq!(subjects, vec!["new", "old"]);
        Ok(())
    }
}
