use hamlet_game::models::village::Village;
use hamlet_types::errors::{AppError, ApplicationError};

use crate::{jobs::Job, uow::UnitOfWork};

/// Loads the village a job belongs to.
pub async fn load_job_village(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    job: &Job,
) -> Result<Village, ApplicationError> {
    let village = uow.villages().get_by_player_id(job.player_id).await?;
    if village.id != job.village_id {
        return Err(ApplicationError::App(AppError::VillageMismatch {
            village_id: job.village_id,
            player_id: job.player_id,
        }));
    }
    Ok(village)
}
