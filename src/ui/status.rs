use crate::events::Device;
use eframe::egui;

pub const UNSUPPORTED_MESSAGE: &str = "MIDI input is not supported on this system.";

const CONNECTED: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);

pub fn connection_button(ui: &mut egui::Ui, connected: bool) -> egui::Response {
    let text = if connected {
        egui::RichText::new("🔌 MIDI Connected").color(CONNECTED)
    } else {
        egui::RichText::new("Connect MIDI").weak()
    };
    ui.button(text)
}

/// Device list with the current selection. Returns the id the user picked.
pub fn device_picker(ui: &mut egui::Ui, devices: &[Device], selected: Option<&str>) -> Option<String> {
    let mut picked = None;

    ui.label(egui::RichText::new("Input Device").strong());
    if devices.is_empty() {
        ui.weak("No MIDI devices found. Please connect your drum kit and refresh.");
    } else {
        let selected_text = selected
            .and_then(|id| devices.iter().find(|device| device.id == id))
            .map(Device::label)
            .unwrap_or_else(|| "Select a device".to_string());

        egui::ComboBox::from_id_salt("midi_device")
            .selected_text(selected_text)
            .width(280.0)
            .show_ui(ui, |ui| {
                for device in devices {
                    let is_selected = selected == Some(device.id.as_str());
                    if ui.selectable_label(is_selected, device.label()).clicked() && !is_selected {
                        picked = Some(device.id.clone());
                    }
                }
            });
    }

    ui.add_space(8.0);
    ui.small(
        "Connect your electronic drum kit over USB or a MIDI interface. \
         Pad note numbers vary between kits; load a drum profile if hits \
         light up the wrong piece.",
    );

    picked
}
