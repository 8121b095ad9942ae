//! Dart rendering of the handler interfaces and the request dispatcher.
//!
//! Every exit of `handleRequest` goes through `_respond`, which writes at most one
//! envelope and closes the response exactly once. `_dispatch` returns an envelope from
//! every branch, and its own failures are caught by the caller.

use super::expr::{render, string_literal};
use crate::codegen::dispatch::{AUTH_HANDLER, MAIN_HANDLER};
use crate::ir::server::{
    BODY_BINDING, CORS_HEADERS, REQUEST_BINDING, RESULT_BINDING, TOKEN_BINDING,
};
use crate::ir::{AuthGate, CallArg, HandlerInterface, HandlerTarget, RoutePlan, ServerPlan};
use crate::schema::model::{AUTH_LEVEL_ENUM, EXCEPTION_ENUM};
use crate::schema::BuiltinException;
use crate::targets::CodeWriter;

const ENVELOPE: &str = "Map<String, dynamic>";

fn code_of(exception: &str) -> String {
    format!("{e}.values.indexOf({e}.{x})", e = EXCEPTION_ENUM, x = exception)
}

fn failure(exception: BuiltinException) -> String {
    format!("_failure({}.{})", EXCEPTION_ENUM, exception.label())
}

pub fn handler_interface(w: &mut CodeWriter, iface: &HandlerInterface) {
    w.block(&format!("abstract class {}", iface.name), |w| {
        for method in &iface.methods {
            let params: Vec<String> = method
                .params
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name))
                .collect();
            w.line(&format!(
                "{} {}({});",
                method.returns.as_deref().unwrap_or("void"),
                method.name,
                params.join(", ")
            ));
        }
    });
    w.blank_line();
}

fn handler_params(plan: &ServerPlan) -> String {
    match plan.auth {
        Some(_) => format!("{} handler, {} auth", MAIN_HANDLER, AUTH_HANDLER),
        None => format!("{} handler", MAIN_HANDLER),
    }
}

fn handler_args(plan: &ServerPlan) -> &'static str {
    match plan.auth {
        Some(_) => "handler, auth",
        None => "handler",
    }
}

pub fn dispatcher(w: &mut CodeWriter, plan: &ServerPlan) {
    // 1. Shared helpers
    w.line(&format!(
        "{} _failure({} exception) => {{'code': {}.values.indexOf(exception)}};",
        ENVELOPE, EXCEPTION_ENUM, EXCEPTION_ENUM
    ));
    w.blank_line();

    w.block(
        &format!("void _respond(HttpRequest request, {}? envelope)", ENVELOPE),
        |w| {
            w.block("if (envelope != null)", |w| {
                w.line("String body;");
                w.block("try", |w| w.line("body = jsonEncode(envelope);"));
                w.chain("catch (e, t)", |w| {
                    w.line("print('Response encoding error:\\n$e\\n$t');");
                    w.line(&format!(
                        "body = jsonEncode({});",
                        failure(BuiltinException::InternalError)
                    ));
                });
                w.line("request.response.write(body);");
            });
            w.line("request.response.close();");
        },
    );
    w.blank_line();

    // 2. Entry point
    w.block(
        &format!(
            "Future handleRequest(HttpRequest request, {}) async",
            handler_params(plan)
        ),
        |w| {
            for (name, value) in CORS_HEADERS {
                w.line(&format!(
                    "request.response.headers.add({}, {});",
                    string_literal(name),
                    string_literal(value)
                ));
            }
            w.block("if (request.method == 'OPTIONS')", |w| {
                w.line("_respond(request, null);");
                w.line("return;");
            });
            w.block("if (request.method != 'POST')", |w| {
                w.line("print(\"Unsupported method: '${request.method}'\");");
                w.line(&format!(
                    "_respond(request, {});",
                    failure(BuiltinException::UnsupportedMethod)
                ));
                w.line("return;");
            });
            w.blank_line();
            w.line("print('${request.uri}');");
            w.line(&format!("{} envelope;", ENVELOPE));
            w.block("try", |w| {
                w.line(&format!(
                    "envelope = await _dispatch(request, {});",
                    handler_args(plan)
                ));
            });
            w.chain("catch (e, t)", |w| {
                w.line("print('Dispatch failure:\\n$e\\n$t');");
                w.line(&format!(
                    "envelope = {};",
                    failure(BuiltinException::InternalError)
                ));
            });
            w.line("_respond(request, envelope);");
        },
    );
    w.blank_line();

    // 3. Routing
    w.block(
        &format!(
            "Future<{}> _dispatch(HttpRequest request, {}) async",
            ENVELOPE,
            handler_params(plan)
        ),
        |w| {
            w.block("switch (request.uri.path)", |w| {
                for route in &plan.routes {
                    route_case(w, route);
                }
                w.line("default:");
                let _indent = w.indent();
                w.line("print('Unsupported endpoint!');");
                w.line(&format!(
                    "return {};",
                    failure(BuiltinException::UnsupportedEndpoint)
                ));
            });
        },
    );
    w.blank_line();
}

fn route_case(w: &mut CodeWriter, route: &RoutePlan) {
    w.block(&format!("case {}:", string_literal(&route.path())), |w| {
        // Parsed
        if route.reads_body() {
            if let Some(request) = &route.request {
                w.line(&format!("final {} {};", request.ty, REQUEST_BINDING));
            }
            if let Some(token) = &route.token {
                w.line(&format!("final {} {};", token.ty, TOKEN_BINDING));
            }
            w.block("try", |w| {
                w.line(&format!(
                    "final {} = jsonDecode(await utf8.decoder.bind(request).join());",
                    BODY_BINDING
                ));
                if let Some(request) = &route.request {
                    w.line(&format!(
                        "{} = {};",
                        REQUEST_BINDING,
                        render(&request.conversion)
                    ));
                }
                if let Some(token) = &route.token {
                    w.line(&format!("{} = {};", TOKEN_BINDING, render(&token.conversion)));
                }
            });
            w.chain("catch (e, t)", |w| {
                w.line("print('Object format error:\\n$e\\n$t');");
                w.line(&format!(
                    "return {};",
                    failure(BuiltinException::ObjectFormatError)
                ));
            });
            w.blank_line();
        }

        w.block("try", |w| {
            // Authorized
            match &route.gate {
                AuthGate::Open => {}
                AuthGate::Level { required, .. } => {
                    w.line(&format!(
                        "final tokenLevel = auth.validateToken({});",
                        TOKEN_BINDING
                    ));
                    w.block(
                        &format!(
                            "if ({l}.values.indexOf(tokenLevel) < {l}.values.indexOf({l}.{r}))",
                            l = AUTH_LEVEL_ENUM,
                            r = required
                        ),
                        |w| {
                            w.line(&format!(
                                "return {};",
                                failure(BuiltinException::Unauthorized)
                            ))
                        },
                    );
                }
                AuthGate::Custom {
                    predicate,
                    with_request,
                } => {
                    let args = if *with_request {
                        format!("{}, {}", TOKEN_BINDING, REQUEST_BINDING)
                    } else {
                        TOKEN_BINDING.to_string()
                    };
                    w.block(&format!("if (!auth.{}({}))", predicate, args), |w| {
                        w.line(&format!(
                            "return {};",
                            failure(BuiltinException::Unauthorized)
                        ))
                    });
                }
            }

            // Invoked
            let receiver = match route.call.target {
                HandlerTarget::Main => "handler",
                HandlerTarget::Auth => "auth",
            };
            let args: Vec<&str> = route
                .call
                .args
                .iter()
                .map(|a| match a {
                    CallArg::Token => TOKEN_BINDING,
                    CallArg::Request => REQUEST_BINDING,
                })
                .collect();
            let call = format!("{}.{}({})", receiver, route.call.method, args.join(", "));

            // Responded
            let success = code_of(&BuiltinException::Success.label());
            match &route.response {
                Some(response) => {
                    w.line(&format!("final {} = {};", RESULT_BINDING, call));
                    w.line(&format!(
                        "return {{'data': {}, 'code': {}}};",
                        render(&response.conversion),
                        success
                    ));
                }
                None => {
                    w.line(&format!("{};", call));
                    w.line(&format!("return {{'code': {}}};", success));
                }
            }
        });
        w.chain(&format!("on {} catch (e, t)", EXCEPTION_ENUM), |w| {
            w.line("print('Handled APIException:\\n$e\\n$t');");
            w.line("return _failure(e);");
        });
        w.chain("catch (e, t)", |w| {
            w.line("print('Unhandled exception from API:\\n$e\\n$t');");
            w.line(&format!(
                "return {};",
                failure(BuiltinException::InternalError)
            ));
        });
    });
}
