#![deny(missing_docs)]

//! # Dispatch Builder
//!
//! Builds the server side: the handler interfaces and one [`RoutePlan`] per endpoint.

use crate::error::{AppError, AppResult};
use crate::ir::server::{BODY_BINDING, RESULT_BINDING};
use crate::ir::{
    AuthGate, Binding, CallArg, Expr, HandlerCall, HandlerInterface, HandlerMethod,
    HandlerTarget, Param, RoutePlan, ServerPlan,
};
use crate::schema::model::AUTH_LEVEL_ENUM;
use crate::schema::{AuthDef, AuthRequirement, EndpointDef, EndpointKind, HandledBy, Schema};
use crate::synth::Synthesizer;
use tracing::debug;

/// Name of the primary handler interface.
pub const MAIN_HANDLER: &str = "APIHandler";
/// Name of the auth handler interface.
pub const AUTH_HANDLER: &str = "AuthHandler";

/// Builds the complete server plan.
pub fn build_server(schema: &Schema, synth: &Synthesizer<'_>) -> AppResult<ServerPlan> {
    let main = HandlerInterface {
        name: MAIN_HANDLER.to_string(),
        methods: schema
            .endpoints
            .values()
            .filter(|e| e.kind == EndpointKind::Declared && e.handled_by == HandledBy::Main)
            .map(|e| endpoint_method(schema, e))
            .collect(),
    };

    let auth = schema.auth.as_ref().map(|a| auth_interface(schema, a));

    let routes = schema
        .endpoints
        .values()
        .map(|e| build_route(schema, synth, e))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ServerPlan { main, auth, routes })
}

/// `AuthHandler`: token issuing and validation, then per endpoint (in declaration
/// order) its handler method when `handledBy: auth` and its predicate when `Custom`.
fn auth_interface(schema: &Schema, auth: &AuthDef) -> HandlerInterface {
    let mut methods = vec![
        HandlerMethod {
            name: "generateToken".into(),
            returns: Some(auth.token.clone()),
            params: vec![param("credentials", &auth.credentials)],
        },
        HandlerMethod {
            name: "validateToken".into(),
            returns: Some(AUTH_LEVEL_ENUM.to_string()),
            params: vec![param("token", &auth.token)],
        },
    ];

    for endpoint in schema
        .endpoints
        .values()
        .filter(|e| e.kind == EndpointKind::Declared)
    {
        if endpoint.handled_by == HandledBy::Auth {
            methods.push(endpoint_method(schema, endpoint));
        }
        if endpoint.auth == AuthRequirement::Custom {
            let mut params = vec![param("token", &auth.token)];
            if let Some(input) = &endpoint.input {
                params.push(param("request", input));
            }
            methods.push(HandlerMethod {
                name: predicate_name(&endpoint.name),
                returns: Some("bool".into()),
                params,
            });
        }
    }

    HandlerInterface {
        name: AUTH_HANDLER.to_string(),
        methods,
    }
}

fn endpoint_method(schema: &Schema, endpoint: &EndpointDef) -> HandlerMethod {
    let mut params = Vec::new();
    if endpoint.forward_token {
        if let Some(auth) = &schema.auth {
            params.push(param("token", &auth.token));
        }
    }
    if let Some(input) = &endpoint.input {
        params.push(param("request", input));
    }
    HandlerMethod {
        name: endpoint.name.clone(),
        returns: endpoint.output.clone(),
        params,
    }
}

fn param(name: &str, ty: &str) -> Param {
    Param {
        name: name.to_string(),
        ty: ty.to_string(),
    }
}

/// Name of the custom authorization predicate of `endpoint`.
pub fn predicate_name(endpoint: &str) -> String {
    format!("{}Auth", endpoint)
}

fn build_route(
    schema: &Schema,
    synth: &Synthesizer<'_>,
    endpoint: &EndpointDef,
) -> AppResult<RoutePlan> {
    // 1. Parse
    let body = Expr::var(BODY_BINDING);
    let request = endpoint
        .input
        .as_ref()
        .map(|ty| {
            Ok::<_, AppError>(Binding {
                ty: ty.clone(),
                conversion: synth.decode_text(ty, Expr::index(body.clone(), "data"))?,
            })
        })
        .transpose()?;

    let token = if endpoint.requires_token() {
        let auth = required_auth(schema, endpoint)?;
        Some(Binding {
            ty: auth.token.clone(),
            conversion: synth.decode_text(&auth.token, Expr::index(body, "token"))?,
        })
    } else {
        None
    };

    // 2. Authorize
    let gate = match &endpoint.auth {
        AuthRequirement::None => AuthGate::Open,
        AuthRequirement::Custom => AuthGate::Custom {
            predicate: predicate_name(&endpoint.name),
            with_request: endpoint.input.is_some(),
        },
        AuthRequirement::Level(level) => {
            let levels = required_auth(schema, endpoint)?.level_enum();
            let ordinal = levels.ordinal(level).ok_or_else(|| {
                AppError::Schema(format!(
                    "endpoint `{}` requires unknown auth level `{}`",
                    endpoint.name, level
                ))
            })?;
            AuthGate::Level {
                required: level.clone(),
                ordinal,
            }
        }
    };

    // 3. Invoke
    let (target, method) = match (endpoint.kind, endpoint.handled_by) {
        (EndpointKind::Authorize, _) => (HandlerTarget::Auth, "generateToken".to_string()),
        (EndpointKind::Declared, HandledBy::Main) => (HandlerTarget::Main, endpoint.name.clone()),
        (EndpointKind::Declared, HandledBy::Auth) => (HandlerTarget::Auth, endpoint.name.clone()),
    };
    let mut args = Vec::new();
    if endpoint.forward_token {
        args.push(CallArg::Token);
    }
    if endpoint.input.is_some() {
        args.push(CallArg::Request);
    }

    // 4. Respond
    let response = endpoint
        .output
        .as_ref()
        .map(|ty| {
            Ok::<_, AppError>(Binding {
                ty: ty.clone(),
                conversion: synth.encode_text(ty, Expr::var(RESULT_BINDING))?,
            })
        })
        .transpose()?;

    debug!(endpoint = %endpoint.name, gate = ?gate, "built route");
    Ok(RoutePlan {
        endpoint: endpoint.name.clone(),
        request,
        token,
        gate,
        call: HandlerCall {
            target,
            method,
            args,
        },
        response,
    })
}

fn required_auth<'s>(schema: &'s Schema, endpoint: &EndpointDef) -> AppResult<&'s AuthDef> {
    schema.auth.as_ref().ok_or_else(|| {
        AppError::Schema(format!(
            "endpoint `{}` needs a token but no auth block is configured",
            endpoint.name
        ))
    })
}
