//! Dart rendering of the client library.
//!
//! Token and error hook live in an `ApiSession` passed to every call, so separate
//! sessions never share state.

use super::expr::{render, string_literal};
use crate::ir::client::{REQUEST_PARAM, RESPONSE_BINDING, TOKEN_LOCAL};
use crate::ir::{ClientPlan, ClientStub};
use crate::schema::model::EXCEPTION_ENUM;
use crate::schema::BuiltinException;
use crate::targets::CodeWriter;

const SESSION: &str = "ApiSession";

fn fail(exception: BuiltinException) -> String {
    format!("session.fail({}.{});", EXCEPTION_ENUM, exception.label())
}

pub fn client(w: &mut CodeWriter, plan: &ClientPlan) {
    session_class(w, plan);

    w.block("class API", |w| {
        if let Some(auth) = &plan.auth {
            w.line(&format!(
                "static Future<void> authorize({} session, {} credentials) async =>",
                SESSION, auth.credentials
            ));
            {
                let _indent = w.indent();
                w.line(&format!(
                    "session.token = await {}(session, credentials);",
                    auth.authorize_stub
                ));
            }
            w.blank_line();
        }

        for (i, stub) in plan.stubs.iter().enumerate() {
            if i > 0 {
                w.blank_line();
            }
            client_stub(w, plan, stub);
        }
    });
}

fn session_class(w: &mut CodeWriter, plan: &ClientPlan) {
    w.block(&format!("class {}", SESSION), |w| {
        if let Some(auth) = &plan.auth {
            w.line(&format!("{}? token;", auth.token));
        }
        w.line(&format!("void Function({})? onError;", EXCEPTION_ENUM));
        w.blank_line();
        w.line(&format!("{}({{this.onError}});", SESSION));
        w.blank_line();
        w.block(&format!("Never fail({} error)", EXCEPTION_ENUM), |w| {
            w.line("onError?.call(error);");
            w.line("throw error;");
        });
        if plan.auth.is_some() {
            w.blank_line();
            w.line("void clearToken() => token = null;");
        }
    });
    w.blank_line();
}

fn client_stub(w: &mut CodeWriter, plan: &ClientPlan, stub: &ClientStub) {
    let returns = stub
        .response
        .as_ref()
        .map(|b| b.ty.as_str())
        .unwrap_or("void");
    let mut params = format!("{} session", SESSION);
    if let Some(request) = &stub.request {
        params.push_str(&format!(", {} {}", request.ty, REQUEST_PARAM));
    }

    w.block(
        &format!("static Future<{}> {}({}) async", returns, stub.name, params),
        |w| {
            // 1. A token is required but none is held: fail without sending.
            if stub.token.is_some() {
                w.line(&format!("final {} = session.token;", TOKEN_LOCAL));
                w.block(&format!("if ({} == null)", TOKEN_LOCAL), |w| {
                    w.line(&fail(BuiltinException::Unauthorized));
                });
            }

            // 2. Transport and envelope decoding
            w.line(&format!("final Map<String, dynamic> {};", RESPONSE_BINDING));
            w.line(&format!("final {} code;", EXCEPTION_ENUM));
            w.block("try", |w| {
                let url = format!(
                    "Uri.{}({}, {})",
                    plan.base.scheme(),
                    string_literal(&plan.base.host),
                    string_literal(&stub.path())
                );
                let mut call = format!("await post({}", url);
                if stub.sends_body() {
                    let mut fields = Vec::new();
                    if let Some(request) = &stub.request {
                        fields.push(format!("'data': {}", render(&request.conversion)));
                    }
                    if let Some(token) = &stub.token {
                        fields.push(format!("'token': {}", render(&token.conversion)));
                    }
                    call.push_str(&format!(
                        ", body: jsonEncode({{{}}}), headers: {{HttpHeaders.contentTypeHeader: 'application/json'}}",
                        fields.join(", ")
                    ));
                }
                call.push(')');
                w.line(&format!("{} = jsonDecode(({}).body);", RESPONSE_BINDING, call));
                w.line(&format!(
                    "code = {}.values[{}['code'] as int];",
                    EXCEPTION_ENUM, RESPONSE_BINDING
                ));
            });
            w.chain("catch (e)", |w| {
                w.line(&fail(BuiltinException::InternalError));
            });
            w.blank_line();

            // 3. Server-reported failure: stop before touching `data`.
            w.block(
                &format!(
                    "if (code != {}.{})",
                    EXCEPTION_ENUM,
                    BuiltinException::Success.label()
                ),
                |w| w.line("session.fail(code);"),
            );

            // 4. Payload
            if let Some(response) = &stub.response {
                w.block("try", |w| {
                    w.line(&format!("return {};", render(&response.conversion)));
                });
                w.chain("catch (e)", |w| {
                    w.line(&fail(BuiltinException::InternalError));
                });
            }
        },
    );
}
