use pretty_assertions::assert_eq;
use thaum_core::{generate, AppError, GenerationTarget, Schema};

const SCHEMA: &str = r#"
api_url: localhost:8080
enums:
  Color: { Red: red, Green: green }
classes:
  Point: { x: int, y: int }
endpoints:
  echo: { in: Point, out: Point }
"#;

fn render(target: GenerationTarget) -> String {
    let schema = Schema::from_yaml(SCHEMA).unwrap();
    let file = generate(&schema, target).unwrap();
    assert_eq!(file.file_name, "generated.dart");
    file.contents
}

#[test]
fn test_server_prelude_has_no_http_import() {
    let dart = render(GenerationTarget::Server);
    assert!(dart.starts_with("import 'dart:io';\nimport 'dart:convert';\n\nconst kApiUseHttps = false;\n"));
    assert!(!dart.contains("package:http"));
    assert!(!dart.contains("class API "));
}

#[test]
fn test_enum_tables() {
    let dart = render(GenerationTarget::Server);
    assert!(dart.contains("enum Color {\n  Red,\n  Green\n}\n"));
    assert!(dart.contains(
        "Color ColorFromString(String value) => const {\n  'red': Color.Red,\n  'green': Color.Green\n}[value]!;\n"
    ));
    assert!(dart.contains(
        "String ColorToString(Color value) => const {\n  Color.Red: 'red',\n  Color.Green: 'green'\n}[value]!;\n"
    ));
}

#[test]
fn test_class_codec() {
    let dart = render(GenerationTarget::Server);
    assert!(dart.contains("class Point {\n  final int x;\n  final int y;\n"));
    assert!(dart.contains("  Point({required this.x, required this.y});\n"));
    assert!(dart.contains(
        "  static Point fromJson(Map<String, dynamic> json) => Point(\n    x: json['x'] as int,\n    y: json['y'] as int\n  );\n"
    ));
    assert!(dart.contains("  Map<String, dynamic> toJson() => {\n    'x': x,\n    'y': y\n  };\n"));
}

#[test]
fn test_dispatcher_route() {
    let dart = render(GenerationTarget::Server);
    assert!(dart.contains("abstract class APIHandler {\n  Point echo(Point request);\n}\n"));
    assert!(dart.contains("Future handleRequest(HttpRequest request, APIHandler handler) async {"));
    assert!(dart.contains("  switch (request.uri.path) {\n    case '/echo': {\n      final Point reqData;\n"));
    assert!(dart.contains("        reqData = Point.fromJson(reqBody['data']);\n"));
    assert!(dart.contains("        final result = handler.echo(reqData);\n"));
    assert!(dart.contains(
        "        return {'data': result.toJson(), 'code': APIException.values.indexOf(APIException.Success)};\n"
    ));
    assert!(dart.contains("      } on APIException catch (e, t) {\n"));
    assert!(dart.contains("    default:\n      print('Unsupported endpoint!');\n"));
}

#[test]
fn test_exception_enum_lists_builtins_in_order() {
    let dart = render(GenerationTarget::Server);
    assert!(dart.contains(
        "enum APIException {\n  Success,\n  UnsupportedMethod,\n  UnsupportedEndpoint,\n  ObjectFormatError,\n  InternalError,\n  Unauthorized\n}\n"
    ));
}

#[test]
fn test_client_stub() {
    let dart = render(GenerationTarget::Frontend);
    assert!(dart.contains("import 'package:http/http.dart';\n"));
    assert!(!dart.contains("handleRequest"));
    assert!(dart.contains("  static Future<Point> echo(ApiSession session, Point request) async {\n"));
    assert!(dart.contains(
        "      res = jsonDecode((await post(Uri.http('localhost:8080', '/echo'), body: jsonEncode({'data': request.toJson()}), headers: {HttpHeaders.contentTypeHeader: 'application/json'})).body);\n"
    ));
    assert!(dart.contains("      return Point.fromJson(res['data']);\n"));
}

#[test]
fn test_thaum_target_emits_both_halves() {
    let dart = render(GenerationTarget::Thaum);
    assert!(dart.contains("handleRequest"));
    assert!(dart.contains("class ApiSession {"));
    let server = dart.find("Future handleRequest").unwrap();
    let client = dart.find("class ApiSession").unwrap();
    assert!(server < client);
}

#[test]
fn test_unusable_map_key_is_fatal() {
    let schema = Schema::from_yaml(
        "api_url: localhost\nclasses:\n  Point: { x: int }\n  Bag: { items: \"Map<Point, int>\" }\n",
    )
    .unwrap();
    match generate(&schema, GenerationTarget::Server) {
        Err(AppError::Synthesis(msg)) => assert!(msg.contains("`Point`")),
        other => panic!("expected a synthesis error, got {:?}", other.map(|f| f.file_name)),
    }
}

const AUTH_SCHEMA: &str = r#"
api_url: api.example.com
use_https: true
classes:
  Credentials: { name: String, password: String }
  User: { id: int, nick: String? }
  Empty: {}
extensions:
  User: UserExt
auth:
  levels: [Member, Admin]
  in: Credentials
  out: String
endpoints:
  getUser: { in: int, out: User, authLevel: Admin }
  me: { out: UserExt, authLevel: Member }
  rename: { in: String, authLevel: Custom }
  whoami: { out: String, authLevel: Member, forwardToken: true, handledBy: auth }
"#;

fn render_auth(target: GenerationTarget) -> String {
    let schema = Schema::from_yaml(AUTH_SCHEMA).unwrap();
    generate(&schema, target).unwrap().contents
}

#[test]
fn test_prelude_imports_extensions() {
    let dart = render_auth(GenerationTarget::Thaum);
    assert!(dart.starts_with(
        "import 'dart:io';\nimport 'dart:convert';\nimport 'package:http/http.dart';\nimport 'UserExt.dart';\n\nconst kApiUseHttps = true;\n"
    ));
    assert!(dart.contains("enum AuthLevel {\n  Unauthorized,\n  Member,\n  Admin\n}\n"));
}

#[test]
fn test_extended_class_accessor_and_builders() {
    let dart = render_auth(GenerationTarget::Server);
    assert!(dart.contains("  User({required this.id, this.nick});\n"));
    assert!(dart.contains("  UserExt get asUserExt => UserExt(id: id, nick: nick);\n"));
    assert!(dart.contains(
        "  User copyBaseWith({\n    int? id,\n    String? nick\n  }) => User(\n    id: id ?? this.id,\n    nick: nick ?? this.nick\n  );\n\n"
    ));
    assert!(dart.contains(
        "  UserExt copyWith({\n    int? id,\n    String? nick\n  }) => UserExt(\n    id: id ?? this.id,\n    nick: nick ?? this.nick\n  );\n}\n"
    ));
}

#[test]
fn test_empty_class() {
    let dart = render_auth(GenerationTarget::Server);
    assert!(dart.contains(
        "class Empty {\n  const Empty();\n\n  static Empty fromJson(Map<String, dynamic> json) => Empty(\n  );\n\n  Map<String, dynamic> toJson() => {\n  };\n\n  Empty copyWith() => Empty();\n}\n"
    ));
}

#[test]
fn test_handler_interfaces() {
    let dart = render_auth(GenerationTarget::Server);
    assert!(dart.contains(
        "abstract class APIHandler {\n  User getUser(int request);\n  UserExt me();\n  void rename(String request);\n}\n"
    ));
    assert!(dart.contains(
        "abstract class AuthHandler {\n  String generateToken(Credentials credentials);\n  AuthLevel validateToken(String token);\n  bool renameAuth(String token, String request);\n  String whoami(String token);\n}\n"
    ));
    assert!(dart.contains(
        "Future handleRequest(HttpRequest request, APIHandler handler, AuthHandler auth) async {"
    ));
    assert!(dart.contains("    envelope = await _dispatch(request, handler, auth);\n"));
    assert!(dart.contains(
        "Future<Map<String, dynamic>> _dispatch(HttpRequest request, APIHandler handler, AuthHandler auth) async {"
    ));
}

#[test]
fn test_level_gate() {
    let dart = render_auth(GenerationTarget::Server);
    assert!(dart.contains(
        "    case '/getUser': {\n      final int reqData;\n      final String token;\n      try {\n"
    ));
    assert!(dart.contains("        reqData = reqBody['data'] as int;\n        token = reqBody['token'] as String;\n"));
    assert!(dart.contains(
        "        final tokenLevel = auth.validateToken(token);\n        if (AuthLevel.values.indexOf(tokenLevel) < AuthLevel.values.indexOf(AuthLevel.Admin)) {\n          return _failure(APIException.Unauthorized);\n        }\n        final result = handler.getUser(reqData);\n"
    ));
    assert!(dart.contains("        return {'data': result.toJson(), 'code': APIException.values.indexOf(APIException.Success)};\n"));
}

#[test]
fn test_custom_gate_and_auth_routes() {
    let dart = render_auth(GenerationTarget::Server);
    assert!(dart.contains(
        "        if (!auth.renameAuth(token, reqData)) {\n          return _failure(APIException.Unauthorized);\n        }\n        handler.rename(reqData);\n        return {'code': APIException.values.indexOf(APIException.Success)};\n"
    ));
    assert!(dart.contains("        final result = auth.whoami(token);\n"));
    assert!(dart.contains("    case '/_authorize': {\n      final Credentials reqData;\n"));
    assert!(dart.contains("        reqData = Credentials.fromJson(reqBody['data']);\n"));
    assert!(dart.contains("        final result = auth.generateToken(reqData);\n"));
}

#[test]
fn test_client_session() {
    let dart = render_auth(GenerationTarget::Frontend);
    assert!(dart.contains(
        "class ApiSession {\n  String? token;\n  void Function(APIException)? onError;\n\n  ApiSession({this.onError});\n\n  Never fail(APIException error) {\n    onError?.call(error);\n    throw error;\n  }\n\n  void clearToken() => token = null;\n}\n"
    ));
    assert!(dart.contains(
        "  static Future<void> authorize(ApiSession session, Credentials credentials) async =>\n    session.token = await _authorize(session, credentials);\n"
    ));
    assert!(dart.contains(
        "  static Future<String> _authorize(ApiSession session, Credentials request) async {\n"
    ));
}

#[test]
fn test_client_stub_with_token() {
    let dart = render_auth(GenerationTarget::Frontend);
    let expected = "  static Future<User> getUser(ApiSession session, int request) async {
    final token = session.token;
    if (token == null) {
      session.fail(APIException.Unauthorized);
    }
    final Map<String, dynamic> res;
    final APIException code;
    try {
      res = jsonDecode((await post(Uri.https('api.example.com', '/getUser'), body: jsonEncode({'data': request, 'token': token}), headers: {HttpHeaders.contentTypeHeader: 'application/json'})).body);
      code = APIException.values[res['code'] as int];
    } catch (e) {
      session.fail(APIException.InternalError);
    }

    if (code != APIException.Success) {
      session.fail(code);
    }
    try {
      return User.fromJson(res['data']);
    } catch (e) {
      session.fail(APIException.InternalError);
    }
  }
";
    assert!(dart.contains(expected), "missing stub:\n{}", expected);
    assert!(dart.contains("      return User.fromJson(res['data']).asUserExt;\n"));
}
