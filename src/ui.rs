use crate::app::{App, Dialog};
use crate::db::ExpenseStore;
use crate::model::CATEGORIES;
use eframe::egui::{self, Color32, CornerRadius, FontId, RichText, Stroke, Vec2};

// ===== UI 主题配置 =====
struct Theme {
    bg_color: Color32,
    card_color: Color32,
    input_bg: Color32,
    accent_color: Color32,
    green_color: Color32,
    text_primary: Color32,
    text_secondary: Color32,
    danger_color: Color32,
    warning_color: Color32,
    row_alt: Color32,
}

impl Theme {
    fn default() -> Self {
        Self {
            bg_color: Color32::from_rgb(25, 28, 32),
            card_color: Color32::from_rgb(35, 39, 45),
            input_bg: Color32::from_rgb(45, 50, 58),
            accent_color: Color32::from_rgb(64, 169, 255),
            green_color: Color32::from_rgb(82, 196, 126),
            text_primary: Color32::from_rgb(230, 230, 235),
            text_secondary: Color32::from_rgb(140, 145, 155),
            danger_color: Color32::from_rgb(220, 80, 80),
            warning_color: Color32::from_rgb(230, 180, 80),
            row_alt: Color32::from_rgb(40, 44, 52),
        }
    }
}

// ===== 布局常量配置 =====
struct LayoutConfig {
    content_width: f32,
    panel_margin: f32,
    card_rounding: f32,
    card_inner_margin: f32,
    col_spacing: f32,
    input_height: f32,
}

impl LayoutConfig {
    fn default() -> Self {
        Self {
            content_width: 860.0,
            panel_margin: 24.0,
            card_rounding: 14.0,
            card_inner_margin: 20.0,
            col_spacing: 10.0,
            input_height: 32.0,
        }
    }
}

/// 全局控件样式，启动时设置一次
pub fn apply_style(ctx: &egui::Context) {
    let theme = Theme::default();
    let mut style = (*ctx.style()).clone();
    style.visuals = egui::Visuals::dark();
    style.visuals.widgets.inactive.bg_fill = theme.input_bg;
    style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(60, 65, 75));
    style.visuals.widgets.inactive.corner_radius = CornerRadius::same(8);
    style.visuals.widgets.hovered.bg_fill = Color32::from_rgb(55, 60, 70);
    style.visuals.widgets.active.bg_fill = Color32::from_rgb(50, 55, 65);
    style.visuals.selection.bg_fill = theme.accent_color;
    ctx.set_style(style);
}

enum DialogAction {
    Dismiss,
    Delete(bool),
}

impl<S: ExpenseStore> eframe::App for App<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let theme = Theme::default();
        let layout = LayoutConfig::default();

        self.render_dialog(ctx, &theme);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(theme.bg_color).inner_margin(layout.panel_margin as i8))
            .show(ctx, |ui| {
                // 弹窗打开时主界面不可操作
                ui.add_enabled_ui(self.dialog.is_none(), |ui| {
                    let content_width = layout.content_width.min(ui.available_width());
                    let side_margin = ((ui.available_width() - content_width) / 2.0).max(0.0);
                    ui.horizontal(|ui| {
                        ui.add_space(side_margin);
                        ui.vertical(|ui| {
                            ui.set_width(content_width);
                            self.render_header(ui, &theme);
                            ui.add_space(16.0);
                            self.render_form(ui, &theme, &layout);
                            ui.add_space(16.0);
                            self.render_actions(ui, &theme);
                            ui.add_space(12.0);
                            self.render_table(ui, &theme, &layout);
                        });
                    });
                });
            });
    }
}

impl<S: ExpenseStore> App<S> {
    fn render_header(&self, ui: &mut egui::Ui, theme: &Theme) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("My Expense Tracker")
                .font(FontId::proportional(26.0))
                .color(theme.text_primary));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(self.listed_total().to_string())
                    .font(FontId::proportional(22.0))
                    .color(theme.green_color));
                ui.label(RichText::new("Total")
                    .font(FontId::proportional(13.0))
                    .color(theme.text_secondary));
                ui.add_space(20.0);
                ui.label(RichText::new(self.records.len().to_string())
                    .font(FontId::proportional(22.0))
                    .color(theme.text_primary));
                ui.label(RichText::new("Records")
                    .font(FontId::proportional(13.0))
                    .color(theme.text_secondary));
                if self.is_degraded() {
                    ui.add_space(20.0);
                    ui.label(RichText::new("⚠ Database unavailable")
                        .size(13.0)
                        .color(theme.warning_color));
                }
            });
        });
    }

    fn render_form(&mut self, ui: &mut egui::Ui, theme: &Theme, layout: &LayoutConfig) {
        let label_size = 13.0;
        let input_height = layout.input_height;

        egui::Frame::default()
            .fill(theme.card_color)
            .corner_radius(CornerRadius::same(layout.card_rounding as u8))
            .inner_margin(layout.card_inner_margin as i8)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Add New Expense").color(theme.text_primary).size(16.0));
                ui.add_space(10.0);

                let field_width = (ui.available_width() - layout.col_spacing * 3.0) / 4.0;
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = layout.col_spacing;

                    // 日期（必填）
                    ui.vertical(|ui| {
                        ui.set_width(field_width);
                        required_label(ui, "Date (YYYY-MM-DD)", label_size, theme);
                        ui.horizontal(|ui| {
                            ui.add_sized(
                                [field_width - 58.0, input_height],
                                egui::TextEdit::singleline(&mut self.form.date)
                                    .hint_text("YYYY-MM-DD")
                                    .margin(egui::Margin::symmetric(8, 8)),
                            );
                            let today_btn = egui::Button::new(RichText::new("Today").size(12.0).color(theme.accent_color))
                                .fill(Color32::TRANSPARENT)
                                .stroke(Stroke::new(1.0, theme.accent_color))
                                .corner_radius(CornerRadius::same(6));
                            if ui.add_sized([50.0, input_height], today_btn).clicked() {
                                self.form.reset_date();
                            }
                        });
                    });

                    // 类别：可从预设中选，也可以直接输入
                    ui.vertical(|ui| {
                        ui.set_width(field_width);
                        ui.label(RichText::new("Category").color(theme.text_secondary).size(label_size));
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = 4.0;
                            ui.add_sized(
                                [field_width - 36.0, input_height],
                                egui::TextEdit::singleline(&mut self.form.category)
                                    .margin(egui::Margin::symmetric(8, 8)),
                            );
                            egui::ComboBox::from_id_salt("category_presets")
                                .width(20.0)
                                .selected_text("")
                                .show_ui(ui, |ui| {
                                    for category in CATEGORIES {
                                        if ui.selectable_label(self.form.category == category, category).clicked() {
                                            self.form.category = category.to_string();
                                        }
                                    }
                                });
                        });
                    });

                    // 金额（必填）
                    ui.vertical(|ui| {
                        ui.set_width(field_width);
                        required_label(ui, "Amount", label_size, theme);
                        ui.add_sized(
                            [field_width, input_height],
                            egui::TextEdit::singleline(&mut self.form.amount)
                                .hint_text("0.00")
                                .margin(egui::Margin::symmetric(8, 8)),
                        );
                    });

                    ui.vertical(|ui| {
                        ui.set_width(field_width);
                        ui.label(RichText::new("Description").color(theme.text_secondary).size(label_size));
                        ui.add_sized(
                            [field_width, input_height],
                            egui::TextEdit::singleline(&mut self.form.description)
                                .margin(egui::Margin::symmetric(8, 8)),
                        );
                    });
                });

                ui.add_space(12.0);
                let add_btn = egui::Button::new(RichText::new("Add Expense").size(14.0).color(Color32::WHITE))
                    .fill(theme.green_color)
                    .corner_radius(CornerRadius::same(6));
                if ui.add_sized([ui.available_width(), input_height], add_btn).clicked() {
                    self.add_expense();
                }
            });
    }

    fn render_actions(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        ui.horizontal(|ui| {
            let delete_btn = egui::Button::new(RichText::new("Delete Selected").size(13.0).color(Color32::WHITE))
                .fill(theme.danger_color)
                .corner_radius(CornerRadius::same(6))
                .min_size(Vec2::new(130.0, 30.0));
            if ui.add(delete_btn).clicked() {
                self.request_delete();
            }

            ui.add_space(8.0);

            let summary_btn = egui::Button::new(RichText::new("View Summary").size(13.0).color(Color32::WHITE))
                .fill(theme.accent_color)
                .corner_radius(CornerRadius::same(6))
                .min_size(Vec2::new(130.0, 30.0));
            if ui.add(summary_btn).clicked() {
                self.view_summary();
            }

            if !self.selected.is_empty() {
                ui.add_space(12.0);
                ui.label(RichText::new(format!("{} selected", self.selected.len()))
                    .size(13.0)
                    .color(theme.text_secondary));
            }
        });
    }

    fn render_table(&mut self, ui: &mut egui::Ui, theme: &Theme, layout: &LayoutConfig) {
        egui::Frame::default()
            .fill(theme.card_color)
            .corner_radius(CornerRadius::same(layout.card_rounding as u8))
            .inner_margin(layout.card_inner_margin as i8)
            .show(ui, |ui| {
                let table_w = ui.available_width();
                ui.set_width(table_w);
                ui.set_min_height(ui.available_height().max(260.0));

                // 固定列宽：选择框 + ID/日期/类别/金额/备注
                let check_width = 24.0;
                let data_width = table_w - check_width - layout.col_spacing * 5.0;
                let col_widths = [
                    data_width * 0.08, // ID
                    data_width * 0.18, // 日期
                    data_width * 0.18, // 类别
                    data_width * 0.16, // 金额
                    data_width * 0.40, // 备注
                ];
                let headers = ["ID", "Date", "Category", "Amount", "Description"];

                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = layout.col_spacing;
                    ui.add_space(check_width);
                    for (width, header) in col_widths.iter().zip(headers) {
                        ui.add_sized([*width, 22.0], egui::Label::new(
                            RichText::new(header).color(theme.text_secondary).size(14.0)
                        ));
                    }
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if self.records.is_empty() {
                            ui.add_space(60.0);
                            ui.vertical_centered(|ui| {
                                ui.label(RichText::new("No expenses recorded yet")
                                    .color(theme.text_secondary)
                                    .size(16.0));
                            });
                            return;
                        }

                        let mut toggled: Vec<(i64, bool)> = Vec::new();
                        for (idx, record) in self.records.iter().enumerate() {
                            let row_bg = if idx % 2 == 1 { theme.row_alt } else { Color32::TRANSPARENT };
                            egui::Frame::default()
                                .fill(row_bg)
                                .corner_radius(CornerRadius::same(6))
                                .inner_margin(egui::Margin::symmetric(4, 4))
                                .show(ui, |ui| {
                                    ui.horizontal(|ui| {
                                        ui.spacing_mut().item_spacing.x = layout.col_spacing;
                                        let mut checked = self.selected.contains(&record.id);
                                        if ui.add_sized([check_width, 24.0], egui::Checkbox::new(&mut checked, "")).changed() {
                                            toggled.push((record.id, checked));
                                        }
                                        let amount = record.amount.to_string();
                                        let cells = [
                                            (record.id.to_string(), theme.text_secondary),
                                            (record.date.clone(), theme.text_primary),
                                            (record.category.clone(), theme.text_primary),
                                            (amount, theme.green_color),
                                            (record.description.clone(), theme.text_primary),
                                        ];
                                        for (width, (text, color)) in col_widths.iter().zip(cells) {
                                            ui.add_sized([*width, 24.0], egui::Label::new(
                                                RichText::new(text).color(color).size(14.0)
                                            ).truncate());
                                        }
                                    });
                                });
                        }

                        for (id, checked) in toggled {
                            self.toggle_selected(id, checked);
                        }
                    });
            });
    }

    fn render_dialog(&mut self, ctx: &egui::Context, theme: &Theme) {
        let Some(dialog) = self.dialog.clone() else {
            return;
        };
        let (title, message, color) = match &dialog {
            Dialog::Error { title, message } => (title.clone(), message.clone(), theme.danger_color),
            Dialog::Warning { title, message } => (title.clone(), message.clone(), theme.warning_color),
            Dialog::Info { title, message } => (title.clone(), message.clone(), theme.text_primary),
            Dialog::ConfirmDelete { ids } => (
                "Confirm Delete".to_string(),
                if ids.len() == 1 {
                    "Are you sure you want to delete this record?".to_string()
                } else {
                    format!("Are you sure you want to delete these {} records?", ids.len())
                },
                theme.text_primary,
            ),
        };

        let mut action = None;
        egui::Window::new(RichText::new(title).color(color))
            .id(egui::Id::new("expense_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(280.0);
                ui.add_space(6.0);
                ui.label(RichText::new(message).font(FontId::monospace(14.0)).color(theme.text_primary));
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if let Dialog::ConfirmDelete { .. } = dialog {
                        if ui.button("Yes").clicked() {
                            action = Some(DialogAction::Delete(true));
                        }
                        if ui.button("No").clicked() {
                            action = Some(DialogAction::Delete(false));
                        }
                    } else if ui.button("OK").clicked() {
                        action = Some(DialogAction::Dismiss);
                    }
                });
            });

        match action {
            Some(DialogAction::Dismiss) => self.dismiss_dialog(),
            Some(DialogAction::Delete(confirmed)) => self.answer_delete(confirmed),
            None => {}
        }
    }
}

fn required_label(ui: &mut egui::Ui, text: &str, size: f32, theme: &Theme) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing = Vec2::ZERO;
        ui.label(RichText::new(text).color(theme.text_secondary).size(size));
        ui.label(RichText::new("*").color(theme.danger_color).size(size));
    });
}
