use crate::auth::validate_token;
use crate::config::AppConfig;
use crate::errors::AppError;
use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;

/// Staff gate: requires `Authorization: Bearer <token>` signed with the configured key.
pub struct Authorization;

impl<S, B> Transform<S, ServiceRequest> for Authorization
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthorizationMW<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizationMW {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthorizationMW<S> {
    service: Rc<S>,
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl<S, B> Service<ServiceRequest> for AuthorizationMW<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let secret = req
            .app_data::<web::Data<AppConfig>>()
            .and_then(|config| config.jwt_key.clone());

        let verdict = match (secret, bearer_token(&req)) {
            (None, _) => Err("staff access is not configured"),
            (_, None) => Err("missing bearer token"),
            (Some(secret), Some(token)) if validate_token(token, &secret) => Ok(()),
            _ => Err("invalid or expired token"),
        };

        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?.map_into_left_body();
                    Ok(res)
                })
            }
            Err(reason) => {
                log::warn!("rejected staff request to {}: {}", req.path(), reason);
                let res = AppError::Unauthorized(reason.to_string())
                    .error_response()
                    .map_into_right_body();
                Box::pin(async move { Ok(req.into_response(res)) })
            }
        }
    }
}
