use std::sync::Arc;

use courier_mail::MailService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub mail: MailService,
}
