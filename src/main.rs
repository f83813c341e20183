use toan_thong_minh::GameApp;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_title("Toán Học Thông Minh"),
        ..Default::default()
    };
    eframe::run_native(
        "Toán Học Thông Minh",
        options,
        Box::new(|cc| {
            // Recupera el perfil guardado (estrellas, colecciones, repaso)
            let app: GameApp = cc
                .storage
                .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
                .unwrap_or_default();
            Ok(Box::new(app))
        }),
    )
}
