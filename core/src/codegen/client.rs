#![deny(missing_docs)]

//! # Client Builder
//!
//! Mirrors every route as a client stub. The request side encodes, the response side
//! decodes, using the same synthesized conversions as the server.

use crate::error::AppResult;
use crate::ir::client::{REQUEST_PARAM, RESPONSE_BINDING, TOKEN_LOCAL};
use crate::ir::{ApiBase, Binding, ClientAuth, ClientPlan, ClientStub, Expr};
use crate::schema::model::AUTHORIZE_ENDPOINT;
use crate::schema::Schema;
use crate::synth::Synthesizer;

/// Builds the client plan.
pub fn build_client(schema: &Schema, synth: &Synthesizer<'_>) -> AppResult<ClientPlan> {
    let mut stubs = Vec::with_capacity(schema.endpoints.len());

    for endpoint in schema.endpoints.values() {
        let request = match &endpoint.input {
            Some(ty) => Some(Binding {
                ty: ty.clone(),
                conversion: synth.encode_text(ty, Expr::var(REQUEST_PARAM))?,
            }),
            None => None,
        };
        let token = match (&schema.auth, endpoint.requires_token()) {
            (Some(auth), true) => Some(Binding {
                ty: auth.token.clone(),
                conversion: synth.encode_text(&auth.token, Expr::var(TOKEN_LOCAL))?,
            }),
            _ => None,
        };
        let response = match &endpoint.output {
            Some(ty) => Some(Binding {
                ty: ty.clone(),
                conversion: synth
                    .decode_text(ty, Expr::index(Expr::var(RESPONSE_BINDING), "data"))?,
            }),
            None => None,
        };
        stubs.push(ClientStub {
            name: endpoint.name.clone(),
            request,
            token,
            response,
        });
    }

    Ok(ClientPlan {
        base: ApiBase {
            https: schema.use_https,
            host: schema.api_url.clone(),
        },
        stubs,
        auth: schema.auth.as_ref().map(|a| ClientAuth {
            credentials: a.credentials.clone(),
            token: a.token.clone(),
            authorize_stub: AUTHORIZE_ENDPOINT.to_string(),
        }),
    })
}
