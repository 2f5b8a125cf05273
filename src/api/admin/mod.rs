pub mod v1;

use actix_web::error::ErrorBadRequest;
use actix_web::{dev::Payload, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};

#[derive(Debug)]
pub struct AdminHeaders {
    pub(crate) admin_key: String,
}

impl FromRequest for AdminHeaders {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let headers = req.headers();

        let admin_key = match headers.get("x-admin-key") {
            Some(value) => match value.to_str() {
                Ok(str_val) => str_val.to_string(),
                Err(_) => {
                    return ready(Err(ErrorBadRequest(
                        "Invalid x-admin-key: must be a valid string",
                    )));
                }
            },
            None => {
                return ready(Err(ErrorBadRequest("Missing x-admin-key header")));
            }
        };

        ready(Ok(AdminHeaders { admin_key }))
    }
}
