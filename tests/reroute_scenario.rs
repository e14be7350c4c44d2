use egui::Pos2;
use fleetwright::{Canvas, EngineConfig, PortId, Widget, WidgetId, WidgetKind};
use serde_json::Value;

fn output_of(canvas: &Canvas, widget: &WidgetId) -> PortId {
    canvas
        .widget(widget)
        .unwrap()
        .core()
        .ports()
        .iter()
        .find(|port| port.is_output())
        .map(|port| port.id.clone())
        .unwrap()
}

fn routes_of(canvas: &Canvas, reroute: &WidgetId) -> Value {
    canvas.widget(reroute).unwrap().serialized_data()["routes"].clone()
}

fn route_port(canvas: &Canvas, reroute: &WidgetId, node_type: &str, field: &str) -> PortId {
    let routes = routes_of(canvas, reroute);
    let route = routes
        .as_array()
        .unwrap()
        .iter()
        .find(|route| route["nodeType"] == node_type)
        .unwrap();
    PortId::from(route[field].as_str().unwrap())
}

#[test]
fn test_reroute_end_to_end_eviction() {
    let mut canvas = Canvas::new(EngineConfig::default());
    let first = canvas.add_widget(WidgetKind::Missiles, Pos2::new(0.0, 0.0));
    let second = canvas.add_widget(WidgetKind::Missiles, Pos2::new(0.0, 300.0));
    let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::new(400.0, 100.0));

    let first_weapon = output_of(&canvas, &first);
    let old = canvas.connect_to_widget(&first_weapon, &reroute).unwrap();
    assert_eq!(routes_of(&canvas, &reroute).as_array().unwrap().len(), 1);

    let input = route_port(&canvas, &reroute, "weapon", "inputId");
    assert!(!canvas.port(&input).unwrap().allow_multiple_connections);

    let second_weapon = output_of(&canvas, &second);
    canvas.connect_to_widget(&second_weapon, &reroute).unwrap();

    assert!(!canvas.connections().contains(&old));
    assert_eq!(canvas.connections().len(), 1);
    assert_eq!(routes_of(&canvas, &reroute).as_array().unwrap().len(), 1);

    let rows = canvas.widget(&reroute).unwrap().core().list("routes").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].details, "1 in • 0 out");
}

#[test]
fn test_route_output_fans_out() {
    let mut canvas = Canvas::new(EngineConfig::default());
    let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
    let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
    let first_loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::ZERO);
    let second_loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::ZERO);

    let weapon = output_of(&canvas, &missile);
    canvas.connect_to_widget(&weapon, &reroute).unwrap();
    let route_out = route_port(&canvas, &reroute, "weapon", "outputId");
    canvas.connect_to_widget(&route_out, &first_loadout).unwrap();
    canvas.connect_to_widget(&route_out, &second_loadout).unwrap();

    let rows = canvas.widget(&reroute).unwrap().core().list("routes").unwrap();
    assert_eq!(rows[0].details, "1 in • 2 out");
}

#[test]
fn test_route_dedup_and_even_spacing() {
    let mut canvas = Canvas::new(EngineConfig::default());
    let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
    let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
    let powerplant = canvas.add_widget(WidgetKind::Powerplants, Pos2::ZERO);
    let factory = canvas.add_widget(WidgetKind::Factories, Pos2::ZERO);

    for source in [&missile, &powerplant, &factory] {
        let output = output_of(&canvas, source);
        canvas.connect_to_widget(&output, &reroute).unwrap();
    }
    let weapon_in = route_port(&canvas, &reroute, "weapon", "inputId");
    let other_missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
    let other_weapon = output_of(&canvas, &other_missile);
    canvas.connect_to_widget(&other_weapon, &reroute).unwrap();
    assert_eq!(route_port(&canvas, &reroute, "weapon", "inputId"), weapon_in);

    let routes = routes_of(&canvas, &reroute);
    let routes = routes.as_array().unwrap();
    assert_eq!(routes.len(), 3);
    let total = routes.len();
    for (index, route) in routes.iter().enumerate() {
        let expected = (index + 1) as f32 / (total + 1) as f32;
        for field in ["inputId", "outputId"] {
            let id = PortId::from(route[field].as_str().unwrap());
            assert_eq!(canvas.port(&id).unwrap().relative_y, expected);
        }
    }
}

#[test]
fn test_single_route_sits_at_half_height() {
    let mut canvas = Canvas::new(EngineConfig::default());
    let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::ZERO);
    let powerplant = canvas.add_widget(WidgetKind::Powerplants, Pos2::ZERO);
    let power = output_of(&canvas, &powerplant);
    canvas.connect_to_widget(&power, &reroute).unwrap();

    let input = route_port(&canvas, &reroute, "power", "inputId");
    let port = canvas.port(&input).unwrap();
    assert_eq!(port.relative_y, 0.5);
    assert_eq!(port.position.y, 115.0);
}

#[test]
fn test_group_cap_under_connect_churn() {
    let mut canvas = Canvas::new(EngineConfig::default());
    let loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::ZERO);
    let sources: Vec<WidgetId> = (0..6)
        .map(|_| canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO))
        .collect();
    let mut live = Vec::new();

    for step in 0..40 {
        let source = &sources[step % sources.len()];
        let weapon = output_of(&canvas, source);
        if step % 3 == 2 && !live.is_empty() {
            let connection = live.remove(step % live.len());
            canvas.disconnect(&connection);
        } else if let Ok(connection) = canvas.connect_to_widget(&weapon, &loadout) {
            live.push(connection);
        }
        live.retain(|id| canvas.connections().contains(id));

        let nodes = canvas.widget(&loadout).unwrap().core().nodes();
        let free = nodes.free_slots("weapon-slots");
        assert!(free <= 2, "step {step}: {free} free weapon slots");
        assert!(!nodes.group("weapon-slots").unwrap().members.is_empty());
    }
}

#[test]
fn test_snapshot_round_trip_restores_route_ids() {
    let mut canvas = Canvas::new(EngineConfig::default());
    let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::new(300.0, 80.0));
    let missile = canvas.add_widget(WidgetKind::Missiles, Pos2::ZERO);
    let powerplant = canvas.add_widget(WidgetKind::Powerplants, Pos2::ZERO);
    for source in [&missile, &powerplant] {
        let output = output_of(&canvas, source);
        canvas.connect_to_widget(&output, &reroute).unwrap();
    }
    let before = routes_of(&canvas, &reroute);
    let json = canvas.to_json().unwrap();

    let restored = Canvas::from_json(&json, EngineConfig::default()).unwrap();
    assert_eq!(routes_of(&restored, &reroute), before);
    assert_eq!(restored.connections().len(), 2);

    let weapon_in = route_port(&restored, &reroute, "weapon", "inputId");
    assert!(restored.port(&weapon_in).unwrap().is_connected());
    let rows = restored.widget(&reroute).unwrap().core().list("routes").unwrap();
    assert_eq!(rows[1].name, "Power");
    assert_eq!(rows[1].details, "1 in • 0 out");
}

#[test]
fn test_reflow_is_idempotent() {
    let mut canvas = Canvas::new(EngineConfig::default());
    let loadout = canvas.add_widget(WidgetKind::Loadouts, Pos2::ZERO);
    let positions = |canvas: &Canvas| -> Vec<Pos2> {
        canvas
            .widget(&loadout)
            .unwrap()
            .core()
            .ports()
            .iter()
            .map(|port| port.position)
            .collect()
    };
    let before = positions(&canvas);
    canvas.widget_mut(&loadout).unwrap().core_mut().reflow_nodes();
    canvas.widget_mut(&loadout).unwrap().core_mut().reflow_nodes();
    assert_eq!(positions(&canvas), before);
}
