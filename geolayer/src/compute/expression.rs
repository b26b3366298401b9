//! Computation graphs in the Earth Engine REST expression encoding.
//!
//! Nothing is evaluated client side. Each builder method wraps the receiver into a new function
//! invocation node, and the whole tree is sent with the tile request. The service evaluates it
//! lazily when tiles are fetched.

use geojson::{Feature, Geometry, Value as GeoValue};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

/// Node of a serialized computation graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueNode {
    /// Literal JSON value.
    ConstantValue(Value),
    /// Call of a server side algorithm.
    FunctionInvocationValue(Invocation),
    /// List of nodes.
    ArrayValue(ArrayValue),
    /// Lambda, used with `Collection.map`.
    FunctionDefinitionValue(FunctionDefinition),
    /// Reference to a lambda argument.
    ArgumentReference(String),
}

/// Call of a named algorithm with named arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    /// Algorithm name, e.g. `Image.select`.
    pub function_name: String,
    /// Arguments in insertion order.
    pub arguments: IndexMap<String, ValueNode>,
}

/// Array node payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayValue {
    /// Elements.
    pub values: Vec<ValueNode>,
}

/// Lambda node payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    /// Names of the arguments referenced from the body.
    pub argument_names: Vec<String>,
    /// Result of the lambda.
    pub body: Box<ValueNode>,
}

/// Complete expression as sent to the service: a table of values and the key of the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    /// Key of the result value.
    pub result: String,
    /// Named values.
    pub values: IndexMap<String, ValueNode>,
}

impl Expression {
    /// Wraps a single root node.
    pub fn new(root: ValueNode) -> Self {
        let mut values = IndexMap::new();
        values.insert("0".to_string(), root);
        Self {
            result: "0".to_string(),
            values,
        }
    }
}

impl ValueNode {
    /// Literal node.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::ConstantValue(value.into())
    }

    /// Invocation node with arguments in the given order.
    pub fn invoke<'a>(
        function_name: &str,
        arguments: impl IntoIterator<Item = (&'a str, ValueNode)>,
    ) -> Self {
        Self::FunctionInvocationValue(Invocation {
            function_name: function_name.to_string(),
            arguments: arguments
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        })
    }

    /// Array node.
    pub fn array(values: impl IntoIterator<Item = ValueNode>) -> Self {
        Self::ArrayValue(ArrayValue {
            values: values.into_iter().collect(),
        })
    }

    /// Name of the invoked algorithm, if this is an invocation node.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::FunctionInvocationValue(invocation) => Some(&invocation.function_name),
            _ => None,
        }
    }

    /// Argument of an invocation node.
    pub fn argument(&self, name: &str) -> Option<&ValueNode> {
        match self {
            Self::FunctionInvocationValue(invocation) => invocation.arguments.get(name),
            _ => None,
        }
    }

    /// Value of a constant node.
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Self::ConstantValue(value) => Some(value),
            _ => None,
        }
    }

    /// Finds the first invocation of `function_name` in this subtree, depth first.
    pub fn find(&self, function_name: &str) -> Option<&ValueNode> {
        if self.function_name() == Some(function_name) {
            return Some(self);
        }

        match self {
            Self::FunctionInvocationValue(invocation) => invocation
                .arguments
                .values()
                .find_map(|arg| arg.find(function_name)),
            Self::ArrayValue(array) => array.values.iter().find_map(|v| v.find(function_name)),
            Self::FunctionDefinitionValue(definition) => definition.body.find(function_name),
            _ => None,
        }
    }
}

/// Single raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Image(ValueNode);

/// Stack of rasters.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCollection(ValueNode);

/// Set of vector features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection(ValueNode);

impl Image {
    /// Loads an image asset.
    pub fn load(id: &str) -> Self {
        Self(ValueNode::invoke("Image.load", [("id", ValueNode::constant(id))]))
    }

    /// Keeps only the given band.
    pub fn select(self, band: &str) -> Self {
        Self(ValueNode::invoke(
            "Image.select",
            [
                ("input", self.0),
                ("bandSelectors", ValueNode::constant(json!([band]))),
            ],
        ))
    }

    /// Clips the image to the union of the collection geometries.
    pub fn clip_to_collection(self, collection: &FeatureCollection) -> Self {
        Self(ValueNode::invoke(
            "Image.clipToCollection",
            [("input", self.0), ("collection", collection.0.clone())],
        ))
    }

    /// Per pixel equality with a constant, producing a boolean image.
    pub fn equals(&self, value: impl Into<Value>) -> Self {
        Self(ValueNode::invoke(
            "Image.eq",
            [
                ("image1", self.0.clone()),
                (
                    "image2",
                    ValueNode::invoke("Image.constant", [("value", ValueNode::constant(value))]),
                ),
            ],
        ))
    }

    /// Masks out pixels where `mask` is zero.
    pub fn update_mask(self, mask: Image) -> Self {
        Self(ValueNode::invoke(
            "Image.updateMask",
            [("image", self.0), ("mask", mask.0)],
        ))
    }

    /// Graph node of the image.
    pub fn node(&self) -> &ValueNode {
        &self.0
    }
}

impl ImageCollection {
    /// Loads an image collection asset.
    pub fn load(id: &str) -> Self {
        Self(ValueNode::invoke(
            "ImageCollection.load",
            [("id", ValueNode::constant(id))],
        ))
    }

    /// Keeps images whose acquisition time lies in `[start, end)`.
    pub fn filter_date(self, start: &str, end: &str) -> Self {
        let range = ValueNode::invoke(
            "DateRange",
            [
                ("start", ValueNode::constant(start)),
                ("end", ValueNode::constant(end)),
            ],
        );
        let filter = ValueNode::invoke(
            "Filter.dateRangeContains",
            [
                ("leftValue", range),
                ("rightField", ValueNode::constant("system:time_start")),
            ],
        );
        Self(ValueNode::invoke(
            "Collection.filter",
            [("collection", self.0), ("filter", filter)],
        ))
    }

    /// Keeps only the given band in every image.
    pub fn select(self, band: &str) -> Self {
        self.map_images("Image.select", |arg| {
            [
                ("input", arg),
                ("bandSelectors", ValueNode::constant(json!([band]))),
            ]
        })
    }

    /// Clips every image to the union of the collection geometries.
    pub fn clip_to_collection(self, collection: &FeatureCollection) -> Self {
        self.map_images("Image.clipToCollection", |arg| {
            [("input", arg), ("collection", collection.0.clone())]
        })
    }

    /// Per pixel mean over the collection.
    pub fn mean(self) -> Image {
        Image(ValueNode::invoke("reduce.mean", [("collection", self.0)]))
    }

    /// Per pixel median over the collection.
    pub fn median(self) -> Image {
        Image(ValueNode::invoke("reduce.median", [("collection", self.0)]))
    }

    /// Graph node of the collection.
    pub fn node(&self) -> &ValueNode {
        &self.0
    }

    fn map_images<'a, const N: usize>(
        self,
        function_name: &str,
        arguments: impl FnOnce(ValueNode) -> [(&'a str, ValueNode); N],
    ) -> Self {
        const ARG: &str = "_MAPPING_VAR_0_0";
        let body = ValueNode::invoke(
            function_name,
            arguments(ValueNode::ArgumentReference(ARG.to_string())),
        );

        let definition = ValueNode::FunctionDefinitionValue(FunctionDefinition {
            argument_names: vec![ARG.to_string()],
            body: Box::new(body),
        });

        Self(ValueNode::invoke(
            "Collection.map",
            [("collection", self.0), ("baseAlgorithm", definition)],
        ))
    }
}

impl FeatureCollection {
    /// Loads a table asset.
    pub fn load(id: &str) -> Self {
        Self(ValueNode::invoke(
            "Collection.loadTable",
            [("tableId", ValueNode::constant(id))],
        ))
    }

    /// Builds an inline collection from GeoJSON features.
    ///
    /// Feature properties are carried over as they are. Features without geometry keep a null
    /// geometry.
    pub fn from_features<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Self {
        let features = features.into_iter().map(|feature| {
            let geometry = feature
                .geometry
                .as_ref()
                .map(geometry_node)
                .unwrap_or_else(|| ValueNode::constant(Value::Null));
            let properties = feature
                .properties
                .clone()
                .map(Value::Object)
                .unwrap_or_else(|| json!({}));

            ValueNode::invoke(
                "Feature",
                [
                    ("geometry", geometry),
                    ("metadata", ValueNode::constant(properties)),
                ],
            )
        });

        Self(ValueNode::invoke(
            "Collection",
            [("features", ValueNode::array(features))],
        ))
    }

    /// Keeps features whose property equals the value.
    pub fn filter_eq(self, property: &str, value: impl Into<Value>) -> Self {
        let filter = ValueNode::invoke(
            "Filter.equals",
            [
                ("leftField", ValueNode::constant(property)),
                ("rightValue", ValueNode::constant(value)),
            ],
        );
        Self(ValueNode::invoke(
            "Collection.filter",
            [("collection", self.0), ("filter", filter)],
        ))
    }

    /// Paints the features with an outline and fill, producing an RGB image.
    pub fn style(self, style: &super::FeatureStyle) -> Image {
        Image(ValueNode::invoke(
            "FeatureCollection.style",
            [
                ("collection", self.0),
                ("color", ValueNode::constant(style.color.as_str())),
                ("fillColor", ValueNode::constant(style.fill_color.as_str())),
                ("width", ValueNode::constant(style.width)),
            ],
        ))
    }

    /// Paints the features with a single color.
    pub fn draw(self, color: &str) -> Image {
        Image(ValueNode::invoke(
            "Collection.draw",
            [
                ("collection", self.0),
                ("color", ValueNode::constant(color)),
            ],
        ))
    }

    /// Number of inline features, or `None` for collections loaded from an asset.
    pub fn inline_len(&self) -> Option<usize> {
        match self.0.argument("features") {
            Some(ValueNode::ArrayValue(array)) => Some(array.values.len()),
            _ => None,
        }
    }

    /// Graph node of the collection.
    pub fn node(&self) -> &ValueNode {
        &self.0
    }
}

fn geometry_node(geometry: &Geometry) -> ValueNode {
    let (constructor, coordinates) = match &geometry.value {
        GeoValue::Point(c) => ("GeometryConstructors.Point", json!(c)),
        GeoValue::MultiPoint(c) => ("GeometryConstructors.MultiPoint", json!(c)),
        GeoValue::LineString(c) => ("GeometryConstructors.LineString", json!(c)),
        GeoValue::MultiLineString(c) => ("GeometryConstructors.MultiLineString", json!(c)),
        GeoValue::Polygon(c) => ("GeometryConstructors.Polygon", json!(c)),
        GeoValue::MultiPolygon(c) => ("GeometryConstructors.MultiPolygon", json!(c)),
        GeoValue::GeometryCollection(geometries) => {
            return ValueNode::invoke(
                "GeometryConstructors.MultiGeometry",
                [(
                    "geometries",
                    ValueNode::array(geometries.iter().map(geometry_node)),
                )],
            );
        }
    };

    ValueNode::invoke(constructor, [("coordinates", ValueNode::constant(coordinates))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_rest_form() {
        let image = Image::load("MODIS/006/MCD12Q1/2020_01_01").select("LC_Type1");
        let expression = Expression::new(image.node().clone());
        let json = serde_json::to_value(&expression).expect("serializable");

        assert_eq!(json["result"], "0");
        let root = &json["values"]["0"]["functionInvocationValue"];
        assert_eq!(root["functionName"], "Image.select");
        assert_eq!(
            root["arguments"]["bandSelectors"]["constantValue"],
            json!(["LC_Type1"])
        );
        assert_eq!(
            root["arguments"]["input"]["functionInvocationValue"]["arguments"]["id"]
                ["constantValue"],
            "MODIS/006/MCD12Q1/2020_01_01"
        );
    }

    #[test]
    fn date_filter_keeps_bounds() {
        let collection =
            ImageCollection::load("MODIS/061/MCD64A1").filter_date("2020-01-01", "2020-12-31");
        let range = collection.node().find("DateRange").expect("date range");

        assert_eq!(
            range.argument("start").and_then(ValueNode::as_constant),
            Some(&json!("2020-01-01"))
        );
        assert_eq!(
            range.argument("end").and_then(ValueNode::as_constant),
            Some(&json!("2020-12-31"))
        );
    }

    #[test]
    fn inline_features_become_constructors() {
        let feature = Feature {
            geometry: Some(Geometry::new(GeoValue::Point(vec![-55.4, -9.26]))),
            ..Default::default()
        };
        let collection = FeatureCollection::from_features([&feature]);

        assert_eq!(collection.inline_len(), Some(1));
        let point = collection
            .node()
            .find("GeometryConstructors.Point")
            .expect("point constructor");
        assert_eq!(
            point.argument("coordinates").and_then(ValueNode::as_constant),
            Some(&json!([-55.4, -9.26]))
        );
    }

    #[test]
    fn loaded_collections_have_no_inline_length() {
        let collection =
            FeatureCollection::load("USDOS/LSIB_SIMPLE/2017").filter_eq("country_na", "Brazil");
        assert_eq!(collection.inline_len(), None);
    }
}
