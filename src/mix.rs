use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{self, Catalog};
use crate::color::{normalize_hex, ColorDb, Rgb};
use crate::error::{GlitterError, GlitterResult};
use crate::rand::Rng;

/// Glitter sizes on offer, in inches, smallest to largest.
pub const AVAILABLE_SIZES: &[f64] = &[0.008, 0.015, 0.025, 0.035, 0.040, 0.062, 0.078, 0.094];

pub const DEFAULT_DENSITY_MAX: u32 = 100;
const IMPORT_DEFAULT_DENSITY: u32 = 50;
const RANDOM_MIN_DENSITY: u32 = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    #[serde(rename = "circle", alias = "dot")]
    Circle,
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "hex", alias = "hexagon")]
    Hexagon,
    #[serde(rename = "slice")]
    Slice,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Square, Shape::Hexagon, Shape::Slice];

    /// Parses the shape names used by the UI, exported mixes, and the valid-combinations catalog.
    pub fn from_name(name: &str) -> Option<Shape> {
        match name.trim().to_lowercase().as_str() {
            "circle" | "dot" => Some(Shape::Circle),
            "square" => Some(Shape::Square),
            "hex" | "hexagon" => Some(Shape::Hexagon),
            "slice" => Some(Shape::Slice),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Hexagon => "hex",
            Shape::Slice => "slice",
        }
    }
}

/// One glitter type in the mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlitterEntry {
    pub id: String,
    pub name: String,
    pub shape: Shape,
    pub size_in: f64,
    pub color: Rgb,
    pub density: u32,
    pub seed: u32,
}

impl GlitterEntry {
    /// The preset name of this entry's color, or `"custom"`.
    pub fn color_name<'a>(&self, palette: &'a ColorDb) -> &'a str {
        palette.color_name(self.color).unwrap_or("custom")
    }

    pub fn title(&self, palette: &ColorDb) -> String {
        format!(
            "{} {} {:.3}\"",
            self.color_name(palette),
            self.shape.label(),
            self.size_in
        )
    }
}

/// Default display name for a freshly created entry, e.g. `Hex 0.035"`.
pub fn auto_name(shape: Shape, size_in: f64) -> String {
    let label = shape.label();
    let mut chars = label.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{} {:.3}\"", capitalized, size_in)
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Export/import payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixPayload<'a> {
    pub base_color: Rgb,
    pub mix: &'a [GlitterEntry],
}

/// Lenient view of an imported entry. Every field may be missing or of the wrong type.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WireGlitterEntry {
    id: Value,
    name: Value,
    shape: Value,
    size_in: Value,
    color: Value,
    density: Value,
    seed: Value,
}

fn wire_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn wire_seed(v: &Value) -> Option<u32> {
    // Matches the `>>> 0` coercion older exports were written with: wrap into u32.
    wire_number(v).map(|n| (n.trunc() as i64) as u32)
}

fn wire_str(v: &Value) -> Option<&str> {
    v.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Everything the user can edit, owned in one place. Rendering only ever borrows this.
#[derive(Debug, Clone, PartialEq)]
pub struct MixState {
    mix: Vec<GlitterEntry>,
    seed_counter: u32,
    skin_tone: Rgb,
    nail_base: Rgb,
    nail_base_customized: bool,
    density_max: u32,
}

impl MixState {
    pub fn new(skin_tone: Rgb, density_max: u32) -> Self {
        MixState {
            mix: Vec::new(),
            seed_counter: 1,
            skin_tone,
            nail_base: skin_tone.shade(0.05),
            nail_base_customized: false,
            density_max: density_max.max(1),
        }
    }

    /// A state using the palette's first skin tone.
    pub fn with_palette(palette: &ColorDb, density_max: u32) -> Self {
        let skin = palette.skin_tones().first().map_or(Rgb::WHITE, |t| t.color);
        Self::new(skin, density_max)
    }

    pub fn entries(&self) -> &[GlitterEntry] {
        &self.mix
    }

    pub fn entry(&self, id: &str) -> Option<&GlitterEntry> {
        self.mix.iter().find(|g| g.id == id)
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut GlitterEntry> {
        self.mix.iter_mut().find(|g| g.id == id)
    }

    pub fn density_max(&self) -> u32 {
        self.density_max
    }

    pub fn next_seed(&mut self) -> u32 {
        self.seed_counter = self.seed_counter.wrapping_add(1);
        self.seed_counter
    }

    pub fn push(&mut self, entry: GlitterEntry) {
        self.mix.push(entry);
    }

    /// Adds a randomly chosen glitter. With a non-empty `filter`, only catalog combinations of
    /// preset colors are drawn from.
    pub fn add_random(
        &mut self,
        rng: &mut Rng,
        palette: &ColorDb,
        filter: Option<&Catalog>,
    ) -> &GlitterEntry {
        let combos = filter
            .map(|c| c.combinations(palette))
            .filter(|c| !c.is_empty());
        let (shape, size_in, color) = match combos {
            Some(combos) => {
                let c = rng.choice(&combos);
                (c.shape, c.size_in, c.color)
            }
            None => (
                *rng.choice(&Shape::ALL),
                *rng.choice(AVAILABLE_SIZES),
                rng.choice(palette.presets()).color,
            ),
        };
        let spread = self.density_max.saturating_sub(RANDOM_MIN_DENSITY) as usize;
        let density =
            (RANDOM_MIN_DENSITY + rng.below(spread) as u32).clamp(1, self.density_max);
        let seed = self.next_seed();
        self.mix.push(GlitterEntry {
            id: fresh_id(),
            name: auto_name(shape, size_in),
            shape,
            size_in,
            color,
            density,
            seed,
        });
        &self.mix[self.mix.len() - 1]
    }

    /// Replaces the mix with 2 to 4 random glitters.
    pub fn randomize(&mut self, rng: &mut Rng, palette: &ColorDb, filter: Option<&Catalog>) {
        let count = 2 + rng.below(3);
        self.mix.clear();
        for _ in 0..count {
            self.add_random(rng, palette, filter);
        }
    }

    /// Appends a copy of the entry with a new id and seed.
    pub fn duplicate(&mut self, id: &str) -> Option<&GlitterEntry> {
        let mut copy = self.entry(id)?.clone();
        copy.id = fresh_id();
        copy.seed = self.next_seed();
        self.mix.push(copy);
        self.mix.last()
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.mix.len();
        self.mix.retain(|g| g.id != id);
        self.mix.len() != before
    }

    pub fn clear(&mut self) {
        self.mix.clear();
    }

    /// Gives every entry a fresh seed, scattering all glitter anew.
    pub fn reroll(&mut self, rng: &mut Rng) {
        for g in &mut self.mix {
            g.seed = g.seed.wrapping_add(rng.below(1000) as u32 + 1);
        }
    }

    pub fn set_density(&mut self, id: &str, density: u32) -> bool {
        let max = self.density_max;
        match self.entry_mut(id) {
            Some(g) => {
                g.density = density.clamp(1, max);
                true
            }
            None => false,
        }
    }

    /// Sets a shape. Under an active filter, shapes the catalog lacks for the entry's color and
    /// size are refused.
    pub fn set_shape(
        &mut self,
        id: &str,
        shape: Shape,
        palette: &ColorDb,
        filter: Option<&Catalog>,
    ) -> bool {
        let Some(g) = self.entry_mut(id) else {
            return false;
        };
        if let Some(c) = filter {
            let valid = c.shapes_for(g.color_name(palette), g.size_in);
            if !valid.is_empty() && !valid.contains(&shape) {
                return false;
            }
        }
        g.shape = shape;
        true
    }

    /// Sets the size from a slider position into [`AVAILABLE_SIZES`], snapping to the nearest
    /// valid size under an active filter.
    pub fn set_size_index(
        &mut self,
        id: &str,
        index: usize,
        palette: &ColorDb,
        filter: Option<&Catalog>,
    ) -> bool {
        let size_in = AVAILABLE_SIZES[index.min(AVAILABLE_SIZES.len() - 1)];
        let Some(g) = self.entry_mut(id) else {
            return false;
        };
        *g = match filter {
            Some(valid) => catalog::resize(g, size_in, valid, palette),
            None => GlitterEntry {
                size_in,
                ..g.clone()
            },
        };
        true
    }

    /// Sets the color; under an active filter size and then shape are adjusted to stay valid.
    pub fn set_color(
        &mut self,
        id: &str,
        color: Rgb,
        palette: &ColorDb,
        filter: Option<&Catalog>,
    ) -> bool {
        let Some(g) = self.entry_mut(id) else {
            return false;
        };
        *g = catalog::recolor(g, color, filter.unwrap_or(&Catalog::default()), palette);
        true
    }

    /// Turning the valid-glitters filter on: move every entry to its closest valid combination.
    pub fn apply_filter(&mut self, valid: &Catalog, palette: &ColorDb) {
        for g in &mut self.mix {
            let fixed = catalog::reconcile(g, valid, palette);
            if fixed != *g {
                tracing::debug!(
                    id = %g.id,
                    shape = fixed.shape.label(),
                    size_in = fixed.size_in,
                    "adjusted glitter to a valid combination"
                );
                *g = fixed;
            }
        }
    }

    pub fn skin_tone(&self) -> Rgb {
        self.skin_tone
    }

    pub fn set_skin_tone(&mut self, skin_tone: Rgb) {
        self.skin_tone = skin_tone;
    }

    pub fn set_nail_base(&mut self, color: Rgb) {
        self.nail_base = color;
        self.nail_base_customized = true;
    }

    /// The nail's base coat: the user's choice if they made one, otherwise a lightened skin tone.
    pub fn nail_color(&self) -> Rgb {
        if self.nail_base_customized {
            self.nail_base
        } else {
            self.skin_tone.shade(0.05)
        }
    }

    pub fn payload(&self) -> MixPayload<'_> {
        MixPayload {
            base_color: self.nail_color(),
            mix: &self.mix,
        }
    }

    pub fn export_json(&self) -> GlitterResult<String> {
        Ok(serde_json::to_string_pretty(&self.payload())?)
    }

    /// Replaces the mix with one read from an exported payload.
    ///
    /// The payload must be an object with a `mix` array. Individual entries are repaired rather
    /// than rejected. On error the current state is left untouched.
    pub fn import_json(&mut self, json: &str) -> GlitterResult<()> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| GlitterError::import(format!("error parsing JSON: {}", e)))?;
        let Some(wire_mix) = root.get("mix").and_then(Value::as_array) else {
            return Err(GlitterError::import(
                "invalid JSON format: missing or invalid mix array",
            ));
        };
        let wire: Vec<WireGlitterEntry> = wire_mix
            .iter()
            .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
            .collect();

        // Keep fresh seeds clear of every imported one.
        let mut next = self.clone();
        if let Some(max_seed) = wire.iter().filter_map(|w| wire_seed(&w.seed)).max() {
            next.seed_counter = next.seed_counter.max(max_seed);
        }
        let mix: Vec<GlitterEntry> = wire
            .into_iter()
            .map(|w| next.entry_from_wire(w))
            .collect();
        next.mix = mix;

        if let Some(base) = root.get("baseColor").and_then(wire_str) {
            next.set_nail_base(Rgb::parse_or(&normalize_hex(base), next.nail_color()));
        }

        tracing::info!(entries = next.mix.len(), "imported mix");
        *self = next;
        Ok(())
    }

    fn entry_from_wire(&mut self, w: WireGlitterEntry) -> GlitterEntry {
        let shape = wire_str(&w.shape)
            .and_then(Shape::from_name)
            .unwrap_or(Shape::Hexagon);
        let size_in = wire_number(&w.size_in).filter(|s| *s > 0.0).unwrap_or(0.0);
        let color = wire_str(&w.color).map_or(Rgb::BLACK, |c| Rgb::parse_or(c, Rgb::BLACK));
        let density = wire_number(&w.density)
            .map_or(IMPORT_DEFAULT_DENSITY as f64, f64::round)
            .clamp(1.0, f64::from(self.density_max)) as u32;
        let seed = match wire_seed(&w.seed) {
            Some(seed) => seed,
            None => self.next_seed(),
        };
        GlitterEntry {
            id: wire_str(&w.id).map_or_else(fresh_id, str::to_string),
            name: wire_str(&w.name).map_or_else(|| auto_name(shape, size_in), str::to_string),
            shape,
            size_in,
            color,
            density,
            seed,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    fn state() -> MixState {
        MixState::with_palette(&ColorDb::from_bundle(), DEFAULT_DENSITY_MAX)
    }

    #[test]
    fn test_shape_names() {
        assert_eq!(Shape::from_name("Dot"), Some(Shape::Circle));
        assert_eq!(Shape::from_name(" hexagon "), Some(Shape::Hexagon));
        assert_eq!(Shape::from_name("hex"), Some(Shape::Hexagon));
        assert_eq!(Shape::from_name("star"), None);
        assert_eq!(serde_json::to_string(&Shape::Hexagon).unwrap(), "\"hex\"");
        assert_eq!(
            serde_json::from_str::<Shape>("\"dot\"").unwrap(),
            Shape::Circle
        );
    }

    #[test]
    fn test_names_and_titles() {
        let palette = ColorDb::from_bundle();
        assert_eq!(auto_name(Shape::Hexagon, 0.035), "Hex 0.035\"");
        assert_eq!(auto_name(Shape::Slice, 0.1), "Slice 0.100\"");
        let g = GlitterEntry {
            id: "a".into(),
            name: "x".into(),
            shape: Shape::Square,
            size_in: 0.04,
            color: Rgb(hex!("e2c636")),
            density: 10,
            seed: 1,
        };
        assert_eq!(g.title(&palette), "Banana Yellow square 0.040\"");
        let custom = GlitterEntry {
            color: Rgb(hex!("010203")),
            ..g
        };
        assert_eq!(custom.title(&palette), "custom square 0.040\"");
    }

    #[test]
    fn test_add_duplicate_remove() {
        let palette = ColorDb::from_bundle();
        let mut s = state();
        let mut rng = Rng::from_seed(42);

        let first = s.add_random(&mut rng, &palette, None).clone();
        assert_eq!(first.seed, 2);
        assert!((20..100).contains(&first.density));
        assert!(AVAILABLE_SIZES.contains(&first.size_in));
        assert!(palette.color_name(first.color).is_some());

        let copy = s.duplicate(&first.id).unwrap().clone();
        assert_ne!(copy.id, first.id);
        assert_eq!(copy.seed, 3);
        assert_eq!((copy.shape, copy.size_in, copy.color), (first.shape, first.size_in, first.color));
        assert_eq!(s.entries().len(), 2);

        assert!(s.remove(&first.id));
        assert!(!s.remove(&first.id));
        assert_eq!(s.entries(), &[copy]);
        assert!(s.duplicate("missing").is_none());
    }

    #[test]
    fn test_randomize_and_reroll() {
        let palette = ColorDb::from_bundle();
        let mut s = state();
        let mut rng = Rng::from_seed(7);
        s.randomize(&mut rng, &palette, None);
        assert!((2..=4).contains(&s.entries().len()));

        let seeds: Vec<u32> = s.entries().iter().map(|g| g.seed).collect();
        s.reroll(&mut rng);
        for (g, old) in s.entries().iter().zip(seeds) {
            let delta = g.seed.wrapping_sub(old);
            assert!((1..=1000).contains(&delta));
        }
    }

    #[test]
    fn test_add_random_with_filter() {
        let palette = ColorDb::from_bundle();
        let catalog = Catalog::from_json(
            r#"[{"color": "Navy", "glitter_shape": "dot", "glitter_size": "0.094"}]"#,
        )
        .unwrap();
        let mut s = state();
        let mut rng = Rng::from_seed(1);
        let g = s.add_random(&mut rng, &palette, Some(&catalog)).clone();
        assert_eq!(
            (g.color, g.shape, g.size_in),
            (Rgb(hex!("213d64")), Shape::Circle, 0.094)
        );
    }

    #[test]
    fn test_editing() {
        let palette = ColorDb::from_bundle();
        let mut s = state();
        let mut rng = Rng::from_seed(3);
        let id = s.add_random(&mut rng, &palette, None).id.clone();

        assert!(s.set_density(&id, 0));
        assert_eq!(s.entry(&id).unwrap().density, 1);
        assert!(s.set_density(&id, 500));
        assert_eq!(s.entry(&id).unwrap().density, 100);

        assert!(s.set_size_index(&id, 99, &palette, None));
        assert_eq!(s.entry(&id).unwrap().size_in, 0.094);

        assert!(s.set_shape(&id, Shape::Slice, &palette, None));
        assert_eq!(s.entry(&id).unwrap().shape, Shape::Slice);

        assert!(s.set_color(&id, Rgb(hex!("abcdef")), &palette, None));
        assert_eq!(s.entry(&id).unwrap().color, Rgb(hex!("abcdef")));
        assert!(!s.set_density("missing", 5));
    }

    #[test]
    fn test_filtered_editing() {
        let palette = ColorDb::from_bundle();
        let catalog = Catalog::from_json(
            r#"[
                {"color": "Navy", "glitter_shape": "dot", "glitter_size": "0.094"},
                {"color": "Navy", "glitter_shape": "hex", "glitter_size": "0.040"}
            ]"#,
        )
        .unwrap();
        let mut s = state();
        s.push(GlitterEntry {
            id: "n".into(),
            name: "n".into(),
            shape: Shape::Slice,
            size_in: 0.008,
            color: Rgb(hex!("e2c636")),
            density: 50,
            seed: 9,
        });

        assert!(s.set_color("n", Rgb(hex!("213d64")), &palette, Some(&catalog)));
        let g = s.entry("n").unwrap();
        assert_eq!((g.shape, g.size_in), (Shape::Hexagon, 0.040));

        assert!(!s.set_shape("n", Shape::Square, &palette, Some(&catalog)));
        assert!(s.set_size_index("n", 7, &palette, Some(&catalog)));
        let g = s.entry("n").unwrap();
        assert_eq!((g.shape, g.size_in), (Shape::Circle, 0.094));
    }

    #[test]
    fn test_apply_filter() {
        let palette = ColorDb::from_bundle();
        let catalog = Catalog::from_json(
            r#"[{"color": "Banana Yellow", "glitter_shape": "square", "glitter_size": "0.062"}]"#,
        )
        .unwrap();
        let mut s = state();
        let base = GlitterEntry {
            id: "b".into(),
            name: "b".into(),
            shape: Shape::Circle,
            size_in: 0.008,
            color: Rgb(hex!("e2c636")),
            density: 50,
            seed: 9,
        };
        s.push(base.clone());
        s.push(GlitterEntry {
            id: "c".into(),
            color: Rgb(hex!("010101")),
            ..base
        });
        s.apply_filter(&catalog, &palette);
        assert_eq!(
            (s.entries()[0].shape, s.entries()[0].size_in),
            (Shape::Square, 0.062)
        );
        assert_eq!(
            (s.entries()[1].shape, s.entries()[1].size_in),
            (Shape::Circle, 0.008)
        );
    }

    #[test]
    fn test_nail_color() {
        let mut s = MixState::new(Rgb(hex!("f1cabf")), 100);
        assert_eq!(s.nail_color(), Rgb(hex!("f6dbd4")));
        s.set_skin_tone(Rgb(hex!("623d33")));
        assert_eq!(s.nail_color(), Rgb(hex!("623d33")).shade(0.05));
        s.set_nail_base(Rgb(hex!("ff0000")));
        assert_eq!(s.nail_color(), Rgb(hex!("ff0000")));
    }

    #[test]
    fn test_export_import_round_trip() {
        let palette = ColorDb::from_bundle();
        let mut s = state();
        let mut rng = Rng::from_seed(11);
        s.randomize(&mut rng, &palette, None);
        s.set_nail_base(Rgb(hex!("112233")));
        let json = s.export_json().unwrap();

        let mut t = state();
        t.import_json(&json).unwrap();
        assert_eq!(t.entries(), s.entries());
        assert_eq!(t.nail_color(), Rgb(hex!("112233")));
    }

    #[test]
    fn test_import_rejects_missing_mix() {
        let palette = ColorDb::from_bundle();
        let mut s = state();
        s.add_random(&mut Rng::from_seed(1), &palette, None);
        let before = s.clone();

        for bad in [r#"{"notMix": []}"#, r#"{"mix": {}}"#, "[]", "{not json"] {
            let err = s.import_json(bad).unwrap_err();
            assert!(matches!(err, GlitterError::Import(_)), "{}", err);
            assert_eq!(s, before);
        }
    }

    #[test]
    fn test_import_coerces_entries() {
        let mut s = state();
        s.import_json(
            r##"{
                "baseColor": "ABC",
                "mix": [
                    {"shape": "dot", "sizeIn": 0.035, "color": "fff", "density": 250, "seed": 40},
                    {"shape": "blob", "sizeIn": -1, "color": "not a color", "seed": "x"},
                    {"sizeIn": "0.062", "seed": -5, "density": 0},
                    17
                ]
            }"##,
        )
        .unwrap();
        let e = s.entries();
        assert_eq!(e.len(), 4);

        assert_eq!(e[0].shape, Shape::Circle);
        assert_eq!(e[0].size_in, 0.035);
        assert_eq!(e[0].color, Rgb::WHITE);
        assert_eq!(e[0].density, 100);
        assert_eq!(e[0].seed, 40);
        assert_eq!(e[0].name, "Circle 0.035\"");
        assert!(!e[0].id.is_empty());

        assert_eq!(e[1].shape, Shape::Hexagon);
        assert_eq!(e[1].size_in, 0.0);
        assert_eq!(e[1].color, Rgb::BLACK);
        assert_eq!(e[1].density, 50);

        assert_eq!(e[2].size_in, 0.062);
        assert_eq!(e[2].seed, 4294967291);
        assert_eq!(e[2].density, 1);

        // Fresh seeds continue past the largest imported one, in entry order.
        assert_eq!(e[1].seed, 4294967292);
        assert_eq!(e[3].seed, 4294967293);
        assert_ne!(e[0].id, e[3].id);

        assert_eq!(s.nail_color(), Rgb(hex!("aabbcc")));
    }
}
