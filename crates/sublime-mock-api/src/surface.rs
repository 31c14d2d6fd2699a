//! The host surface as a static table.
//!
//! Each line of [`STUBS`] declares one host function: its parameter list
//! (with defaults) and what the stand-in does when called. Most entries
//! return a fixed placeholder; the few with behavior point at a function in
//! [`crate::stubs`].

use std::fmt;

use serde_json::{Map, Value};

use crate::PLACEHOLDER_ID;
use crate::attribute::{Param, Signature};
use crate::catalog::{Invocation, StubFn, StubResult, stub_fn};
use crate::stubs;

/// A default parameter value or a module-level constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultArg {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

impl DefaultArg {
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Int(n) => Value::from(n),
            Self::Str(s) => Value::from(s),
        }
    }
}

impl fmt::Display for DefaultArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "'{s}'"),
        }
    }
}

/// A declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: Option<DefaultArg>,
}

/// What a stub does when called.
#[derive(Clone, Copy)]
pub enum Body {
    /// Returns the placeholder identity `1`.
    Identity,
    Zero,
    /// Returns null.
    Nothing,
    EmptyString,
    EmptyList,
    EmptyMap,
    /// Returns `[1]`.
    IdentityList,
    Text(&'static str),
    Custom(fn(&Invocation<'_>) -> StubResult),
}

impl Body {
    /// The fixed return value, for every variant except `Custom`.
    #[must_use]
    pub fn fixed_value(self) -> Option<Value> {
        let value = match self {
            Self::Identity => Value::from(PLACEHOLDER_ID),
            Self::Zero => Value::from(0),
            Self::Nothing => Value::Null,
            Self::EmptyString => Value::String(String::new()),
            Self::EmptyList => Value::Array(Vec::new()),
            Self::EmptyMap => Value::Object(Map::new()),
            Self::IdentityList => Value::Array(vec![Value::from(PLACEHOLDER_ID)]),
            Self::Text(s) => Value::from(s),
            Self::Custom(_) => return None,
        };
        Some(value)
    }

    #[must_use]
    pub fn to_stub_fn(self) -> StubFn {
        match self {
            Self::Custom(f) => stub_fn(f),
            fixed => {
                let value = fixed.fixed_value().unwrap_or(Value::Null);
                stub_fn(move |_| Ok(value.clone()))
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            fixed => write!(f, "Returns({})", fixed.fixed_value().unwrap_or(Value::Null)),
        }
    }
}

/// One host function.
#[derive(Debug, Clone, Copy)]
pub struct StubSpec {
    pub name: &'static str,
    pub params: &'static [ParamSpec],
    pub variadic: bool,
    pub body: Body,
}

impl StubSpec {
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature {
            params: self
                .params
                .iter()
                .map(|p| Param {
                    name: p.name.to_string(),
                    has_default: p.default.is_some(),
                })
                .collect(),
            variadic: self.variadic,
        }
    }

    /// e.g. `get_clipboard(size_limit=16777216)`.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|p| match p.default {
                Some(default) => format!("{}={default}", p.name),
                None => p.name.to_string(),
            })
            .collect();
        if self.variadic {
            parts.push(String::from("**args"));
        }
        format!("{}({})", self.name, parts.join(", "))
    }
}

/// One module-level value.
#[derive(Debug, Clone, Copy)]
pub struct ValueSpec {
    pub name: &'static str,
    pub value: DefaultArg,
}

/// Generate a `&'static [StubSpec]` table.
///
/// ```ignore
/// surface! {
///     stubs {
///         ok_cancel_dialog(msg, ok_title = Str("")) => Custom(stubs::ok_cancel_dialog);
///     }
///     variadic {
///         plugin_host_ready => Nothing;
///     }
/// }
/// ```
macro_rules! surface {
    (@default) => { None };
    (@default $default:expr) => { Some($default) };
    (
        stubs {
            $( $name:ident ( $( $param:ident $(= $default:expr)? ),* ) => $body:expr ; )*
        }
        variadic {
            $( $vname:ident => $vbody:expr ; )*
        }
    ) => {
        &[
            $(
                StubSpec {
                    name: stringify!($name),
                    params: &[
                        $( ParamSpec { name: stringify!($param), default: surface!(@default $($default)?) }, )*
                    ],
                    variadic: false,
                    body: $body,
                },
            )*
            $(
                StubSpec {
                    name: stringify!($vname),
                    params: &[],
                    variadic: true,
                    body: $vbody,
                },
            )*
        ]
    };
}

use Body::{
    Custom, EmptyList, EmptyMap, EmptyString, Identity, IdentityList, Nothing, Text, Zero,
};
use DefaultArg::{Bool, Int, Null, Str};

/// Module-level values of the stand-in.
pub static VALUES: &[ValueSpec] = &[ValueSpec {
    name: "THIS_IS_THE_MOCKED_MODULE",
    value: Bool(true),
}];

/// Every host function the stand-in provides.
pub static STUBS: &[StubSpec] = surface! {
    stubs {
        // application
        log_message(s) => Custom(stubs::log_message);
        version() => Text(crate::MOCK_VERSION);
        platform() => Text("windows");
        architecture() => Text("Mock");
        channel() => Text("Mock");
        executable_path() => Text("Mock");
        packages_path() => Text("Mock");
        installed_packages_path() => Text("Mock");
        cache_path() => Text("Mock");
        status_message(msg) => Custom(stubs::status_message);
        error_message(msg) => Custom(stubs::error_message);
        message_dialog(msg) => Custom(stubs::message_dialog);
        ok_cancel_dialog(msg, ok_title = Str("")) => Custom(stubs::ok_cancel_dialog);
        yes_no_cancel_dialog(msg, yes_title = Str(""), no_title = Str("")) => Custom(stubs::yes_no_cancel_dialog);
        run_command(cmd, args = Null) => Custom(stubs::run_command);
        get_clipboard(size_limit = Int(16_777_216)) => Custom(stubs::get_clipboard);
        set_clipboard(text) => Custom(stubs::set_clipboard);
        log_commands(flag) => Custom(stubs::log_commands);
        log_input(flag) => Custom(stubs::log_input);
        log_result_regex(flag) => Custom(stubs::log_result_regex);
        log_indexing(flag) => Custom(stubs::log_indexing);
        log_build_systems(flag) => Custom(stubs::log_build_systems);
        score_selector(scope_name, selector) => Custom(stubs::score_selector);
        load_resource(name) => Nothing;
        load_binary_resource(name) => Nothing;
        find_resources(pattern) => Nothing;
        encode_value(val, pretty = Bool(false)) => Custom(stubs::encode_value);
        decode_value(data) => Custom(stubs::decode_value);
        expand_variables(val, variables) => Custom(stubs::expand_variables);
        load_settings(base_name) => Zero;
        save_settings(base_name) => Nothing;
        set_timeout(f, timeout_ms = Int(0)) => Custom(stubs::set_timeout);
        set_timeout_async(f, timeout_ms = Int(0)) => Custom(stubs::set_timeout);
        active_window() => Identity;
        windows() => IdentityList;
        get_macro() => EmptyList;
        notify_application_commands(cmds) => Nothing;
        can_accept_input(name, args) => Nothing;

        // window
        window_num_groups(window_id) => Identity;
        window_system_handle(window_id) => Identity;
        window_active_sheet(window_id) => Identity;
        window_active_view(window_id) => Identity;
        window_run_command(window_id, cmd, args) => Custom(stubs::window_run_command);
        window_new_file(window_id, flags, syntax) => Custom(stubs::window_new_file);
        window_open_file(window_id, fname, flags, group) => Custom(stubs::window_open_file);
        window_find_open_file(window_id, fname) => Identity;
        window_close_file(window_id, view_id) => Nothing;
        window_active_group(window_id) => Identity;
        window_focus_group(window_id, idx) => Identity;
        window_focus_sheet(window_id, sheet_id) => Identity;
        window_focus_view(window_id, view_id) => Identity;
        window_get_sheet_index(window_id, sheet_id) => Identity;
        window_get_view_index(window_id, view_id) => Identity;
        window_set_sheet_index(window_id, sheet_id, group, idx) => Identity;
        window_set_view_index(window_id, view_id, group, idx) => Identity;
        window_sheets(window_id) => IdentityList;
        window_views(window_id) => IdentityList;
        window_active_sheet_in_group(window_id, group) => Identity;
        window_active_view_in_group(window_id, group) => Identity;
        window_sheets_in_group(window_id, group) => IdentityList;
        window_views_in_group(window_id, group) => IdentityList;
        window_transient_sheet_in_group(window_id, group) => Identity;
        window_transient_view_in_group(window_id, group) => Identity;
        window_get_layout(window_id) => Identity;
        window_set_layout(window_id, layout) => Identity;
        window_create_output_panel(window_id, name, unlisted) => Identity;
        window_find_output_panel(window_id, name) => Identity;
        window_destroy_output_panel(window_id, name) => Identity;
        window_active_panel(window_id) => EmptyString;
        window_panels(window_id) => IdentityList;
        window_show_input_panel(window_id, caption, initial_text, on_done, on_change, on_cancel) => Identity;
        window_show_quick_panel(window_id, flat_items, items_per_row, on_select, on_highlight, flags, selected_index) => Identity;
        window_is_ui_element_visible(window_id, val) => Identity;
        window_set_ui_element_visible(window_id, val, flag) => Identity;
        is_minimap_visible(window_id, UI_ELEMENT_MINIMAP) => Identity;
        set_minimap_visible(window_id, UI_ELEMENT_MINIMAP, flag) => Identity;
        is_status_bar_visible(window_id, UI_ELEMENT_STATUS_BAR) => Identity;
        set_status_bar_visible(flag) => Identity;
        window_folders(window_id) => EmptyList;
        window_project_file_name(window_id) => Identity;
        window_get_project_data(window_id) => Identity;
        window_set_project_data(window_id, v) => Identity;
        window_settings(window_id) => Identity;
        window_template_settings(window_id) => Identity;
        window_lookup_symbol(window_id, sym) => Identity;
        window_lookup_symbol_in_open_files(window_id, sym) => Identity;
        window_lookup_references(window_id, sym) => Identity;
        window_lookup_references_in_open_files(window_id, sym) => Identity;
        window_extract_variables(window_id) => Identity;
        window_status_message(window_id, msg) => Identity;
        window_can_accept_input(window_id, name, args) => Nothing;

        // sheet
        sheet_window(sheet_id) => Identity;
        sheet_view(sheet_id) => Identity;

        // view
        view_selection_size(view_id) => Identity;
        view_selection_get(view_id, index) => Identity;
        view_selection_erase(view_id, index) => Identity;
        view_buffer_id(view_id) => Identity;
        view_selection_clear(view_id) => Identity;
        view_selection_add_region(view_id, a, b, pos) => Identity;
        view_selection_add_point(view_id, x) => Identity;
        view_selection_subtract_region(view_id, a, b) => Identity;
        view_selection_contains(view_id, a, b) => Identity;
        view_is_primary(view_id) => Identity;
        view_window(view_id) => Identity;
        view_file_name(view_id) => Identity;
        view_retarget(view_id, new_fname) => Identity;
        view_get_name(view_id) => Identity;
        view_set_name(view_id, name) => Identity;
        view_reset_reference_document(view_id) => Identity;
        view_set_reference_document(view_id, reference) => Identity;
        view_is_loading(view_id) => Identity;
        view_is_dirty(view_id) => Identity;
        view_is_read_only(view_id) => Identity;
        view_set_read_only(view_id, read_only) => Identity;
        view_is_scratch(view_id) => Identity;
        view_set_scratch(view_id, scratch) => Identity;
        view_encoding(view_id) => Identity;
        view_set_encoding(view_id, encoding_name) => Identity;
        view_line_endings(view_id) => Identity;
        view_set_line_endings(view_id, line_ending_name) => Identity;
        view_size(view_id) => Identity;
        view_begin_edit(view_id, edit_token, cmd, args) => Identity;
        view_end_edit(view_id, edit_token) => Identity;
        view_is_in_edit(view_id) => Zero;
        view_insert(view_id, edit_token, pt, text) => Identity;
        view_erase(view_id, edit_token, r) => Identity;
        view_replace(view_id, edit_token, r, text) => Identity;
        view_change_count(view_id) => Identity;
        view_run_command(view_id, cmd, args) => Identity;
        view_cached_substr(view_id, a, b) => Identity;
        view_find(view_id, pattern, start_pt, flags) => Identity;
        view_find_all(view_id, pattern, flags) => Identity;
        view_find_all_with_contents(view_id, pattern, flags, fmt) => Identity;
        view_settings(view_id) => Identity;
        view_meta_info(view_id, key, pt) => Identity;
        view_extract_tokens_with_scopes(view_id, begin, end) => Identity;
        view_extract_scope(view_id, pt) => Identity;
        view_scope_name(view_id, pt) => Identity;
        view_match_selector(view_id, pt, selector) => Identity;
        view_score_selector(view_id, pt, selector) => Identity;
        view_find_by_selector(view_id, selector) => Identity;
        view_style(view_id) => Identity;
        view_style_for_scope(view_id, scope) => Identity;
        view_indented_region(view_id, pt) => Identity;
        view_indentation_level(view_id, pt) => Identity;
        view_has_non_empty_selection_region(view_id) => Identity;
        view_lines(view_id, r) => Identity;
        view_split_by_newlines(view_id, r) => Identity;
        view_line_from_region(view_id, x) => Identity;
        view_line_from_point(view_id, x) => Identity;
        view_full_line_from_region(view_id, x) => Identity;
        view_full_line_from_point(view_id, x) => Identity;
        view_word_from_region(view_id, x) => Identity;
        view_word_from_point(view_id, x) => Identity;
        view_classify(view_id, pt) => Identity;
        view_find_by_class(view_id, pt, forward, classes, separators) => Identity;
        view_expand_by_class(view_id, pt, forward, classes, separators) => Identity;
        view_row_col(view_id, tp) => Identity;
        view_text_point(view_id, row, col) => Identity;
        view_visible_region(view_id) => Identity;
        view_show_region(view_id, x, show_surrounds) => Identity;
        view_show_point(view_id, x, show_surrounds) => Identity;
        view_show_region_at_center(view_id, x) => Identity;
        view_show_point_at_center(view_id, x) => Identity;
        view_viewport_position(view_id) => Identity;
        view_set_viewport_position(view_id, xy, animate) => Identity;
        view_viewport_extents(view_id) => Identity;
        view_layout_extents(view_id) => Identity;
        view_text_to_layout(view_id, tp) => Identity;
        view_layout_to_text(view_id, tp) => Identity;
        view_layout_to_window(view_id, tp) => Identity;
        view_window_to_layout(view_id, tp) => Identity;
        view_line_height(view_id) => Identity;
        view_em_width(view_id) => Identity;
        view_is_folded(view_id, sr) => Identity;
        view_folded_regions(view_id) => Identity;
        view_fold_region(view_id, x) => Identity;
        view_fold_regions(view_id, x) => Identity;
        view_unfold_region(view_id, x) => Identity;
        view_unfold_regions(view_id, x) => Identity;
        view_add_regions(view_id, key, regions, scope, icon, flags) => Identity;
        view_get_regions(view_id, key) => Identity;
        view_erase_regions(view_id, key) => Identity;
        view_add_phantom(view_id, key, region, content, layout, on_navigate) => Identity;
        view_erase_phantoms(view_id, key) => Identity;
        view_erase_phantom(view_id, key) => Identity;
        view_query_phantoms(view_id, pids) => Identity;
        view_assign_syntax(view_id, syntax_file) => Identity;
        view_symbols(view_id) => Identity;
        view_indexed_symbols(view_id) => Identity;
        view_indexed_references(view_id) => Identity;
        view_set_status(view_id, key, value) => Identity;
        view_get_status(view_id, key) => Identity;
        view_erase_status(view_id, key) => Identity;
        view_extract_completions(view_id, prefix, tp) => Identity;
        view_find_all_results(view_id) => Identity;
        view_find_all_results_with_text(view_id) => Identity;
        view_command_history(view_id, delta, modifying_only) => Identity;
        view_get_overwrite_status(view_id) => Identity;
        view_set_overwrite_status(view_id, value) => Identity;
        view_show_popup_table(view_id, items, on_select, flags, sel) => Identity;
        view_show_popup(view_id, location, content, flags, max_width, max_height, on_navigate, on_hide) => Identity;
        view_update_popup_content(view_id, content) => Identity;
        view_is_popup_visible(view_id) => Identity;
        view_hide_popup(view_id) => Identity;
        view_is_auto_complete_visible(view_id) => Identity;
        view_can_accept_input(view_id, name, args) => Nothing;

        // settings
        settings_get_default(settings_id, key, default) => Custom(stubs::settings_get_default);
        settings_get(settings_id, key) => Identity;
        settings_has(settings_id, key) => Identity;
        settings_set(settings_id, key, value) => Identity;
        settings_erase(settings_id, key) => Identity;
        settings_add_on_change(settings_id, tag, callback) => Identity;
        settings_clear_on_change(settings_id, tag) => Identity;
    }
    variadic {
        incompatible_syntax_patterns => Nothing;
        plugin_host_loaded_plugins => Nothing;
        plugin_host_ready => Nothing;
        profile_syntax_definition => Nothing;
        run_syntax_test => Nothing;
        verify_pc_signature => Nothing;
        view_substr => Nothing;
        window_is_dragging => Nothing;
    }
};
