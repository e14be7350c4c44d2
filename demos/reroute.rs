use egui::Pos2;
use fleetwright::{Canvas, EngineConfig, WidgetId, WidgetKind};

fn main() {
    let mut canvas = Canvas::new(EngineConfig::default());

    // Two missile designs feeding one reroute widget
    let first = canvas.add_widget(WidgetKind::Missiles, Pos2::new(40.0, 40.0));
    let second = canvas.add_widget(WidgetKind::Missiles, Pos2::new(40.0, 300.0));
    let reroute = canvas.add_widget(WidgetKind::Reroute, Pos2::new(400.0, 160.0));

    let weapon_of = |canvas: &Canvas, widget: &WidgetId| {
        canvas
            .widget(widget)
            .map(|w| w.core().ports()[0].id.clone())
            .unwrap()
    };
    let first_weapon = weapon_of(&canvas, &first);
    let second_weapon = weapon_of(&canvas, &second);

    canvas.connect_to_widget(&first_weapon, &reroute).unwrap();
    println!("After first connection:");
    print_routes(&canvas, &reroute);

    // The route input takes one connection, so this replaces the first
    canvas.connect_to_widget(&second_weapon, &reroute).unwrap();
    println!("After second connection:");
    print_routes(&canvas, &reroute);

    println!("{}", canvas.to_json().unwrap());
}

fn print_routes(canvas: &Canvas, reroute: &WidgetId) {
    let rows = canvas
        .widget(reroute)
        .and_then(|w| w.core().list("routes"))
        .unwrap_or_default();
    for row in rows {
        println!("  {}: {}", row.name, row.details);
    }
}
