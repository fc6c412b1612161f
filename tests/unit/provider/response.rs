use super::*;

#[test]
fn parses_mesh_response() {
    let json = br#"{
        "success": true,
        "image": "img.png",
        "depth_data": [[0.0, 1.0], [0.5, 0.25]],
        "width": 640,
        "height": 480,
        "use_mesh": true
    }"#;
    let r = ProviderResponse::from_json(json).unwrap().into_result().unwrap();
    assert!(r.use_mesh);
    assert_eq!(r.depth_data.as_ref().unwrap().len(), 2);
    assert_eq!(r.width, 640);
    assert!(r.layers.is_empty());
}

#[test]
fn parses_layer_response() {
    let json = br#"{
        "success": true,
        "width": 2, "height": 2,
        "use_mesh": false,
        "layers": [
            {"data": "b.png", "depth": 0.0, "name": "background", "index": 0},
            {"data": "f.png", "depth": 1.0, "name": "foreground", "index": 1}
        ]
    }"#;
    let r = ProviderResponse::from_json(json).unwrap();
    assert_eq!(r.layers.len(), 2);
    assert_eq!(r.layers[1].name, "foreground");
    assert!(r.depth_data.is_none());
}

#[test]
fn failure_becomes_provider_error() {
    let r = ProviderResponse::from_json(br#"{"success": false, "error": "gpu busy"}"#).unwrap();
    let err = r.into_result().unwrap_err();
    assert!(matches!(err, DepthliftError::Provider(ref m) if m == "gpu busy"));

    let err = ProviderResponse::from_json(b"not json").unwrap_err();
    assert!(matches!(err, DepthliftError::Provider(_)));
}
