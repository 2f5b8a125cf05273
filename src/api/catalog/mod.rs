pub mod v1;

use actix_web::error::ErrorBadRequest;
use actix_web::{dev::Payload, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};

#[derive(Debug)]
pub struct VisitorHeaders {
    visitor_id: String,
}

impl FromRequest for VisitorHeaders {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let headers = req.headers();

        let visitor_id = match headers.get("x-visitor-id") {
            Some(value) => match value.to_str() {
                Ok(str_val) => {
                    if str_val.is_empty() {
                        return ready(Err(ErrorBadRequest(
                            "Invalid x-visitor-id: must not be empty",
                        )));
                    }

                    str_val.to_string()
                }
                Err(_) => {
                    return ready(Err(ErrorBadRequest(
                        "Invalid x-visitor-id: must be a valid string",
                    )));
                }
            },
            None => {
                return ready(Err(ErrorBadRequest("Missing x-visitor-id header")));
            }
        };

        ready(Ok(VisitorHeaders { visitor_id }))
    }
}
