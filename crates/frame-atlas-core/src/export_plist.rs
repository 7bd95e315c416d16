use crate::model::Atlas;

/// Apple plist (XML) with frames in a dict keyed by frame id, an `animations`
/// dict of ordered id arrays, and sheet filenames in meta
/// (`textureFileName` for one sheet, `textureFileNames` otherwise).
pub fn to_plist(atlas: &Atlas, sheet_names: &[String]) -> String {
    let mut s = String::new();
    s.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>frames</key>
  <dict>
"#);
    for e in atlas.entries() {
        let (sw, sh) = atlas
            .sheet(e.sheet)
            .map(|p| (p.width(), p.height()))
            .unwrap_or((0, 0));
        let frame = format!(
            "{{{{{},{}}},{{{},{}}}}}",
            e.rect.x, e.rect.y, e.rect.w, e.rect.h
        );
        let alias = e
            .alias_of
            .as_ref()
            .map(|a| format!("      <key>aliasOf</key><string>{}</string>\n", xml_escape(a.as_str())))
            .unwrap_or_default();
        s.push_str(&format!(
            "    <key>{}</key>\n    <dict>\n      <key>sheet</key><integer>{}</integer>\n      <key>sheetSize</key><string>{{{}, {}}}</string>\n      <key>frame</key><string>{}</string>\n      <key>rotated</key><{} />\n{}    </dict>\n",
            xml_escape(e.frame.as_str()),
            e.sheet,
            sw, sh,
            frame,
            if e.rotated { "true" } else { "false" },
            alias,
        ));
    }
    s.push_str("  </dict>\n");

    s.push_str("  <key>animations</key>\n  <dict>\n");
    for g in atlas.groups() {
        s.push_str(&format!("    <key>{}</key>\n    <array>\n", xml_escape(&g.name)));
        for id in &g.frames {
            s.push_str(&format!("      <string>{}</string>\n", xml_escape(id.as_str())));
        }
        s.push_str("    </array>\n");
    }
    s.push_str("  </dict>\n");

    s.push_str("  <key>meta</key>\n  <dict>\n");
    let single = atlas.sheet_count() == 1;
    let images_xml = if single {
        sheet_names.first().map(|n| format!(
            "    <key>textureFileName</key><string>{}</string>\n    <key>realTextureFileName</key><string>{}</string>\n",
            xml_escape(n), xml_escape(n)
        )).unwrap_or_default()
    } else {
        let mut arr = String::new();
        arr.push_str("    <key>textureFileNames</key><array>\n");
        for n in sheet_names {
            arr.push_str(&format!("      <string>{}</string>\n", xml_escape(n)));
        }
        arr.push_str("    </array>\n");
        arr
    };
    let meta = atlas.meta();
    s.push_str(&format!(
        "    <key>app</key><string>{}</string>\n    <key>version</key><string>{}</string>\n    <key>format</key><string>{}</string>\n    <key>allowRotation</key><{} />\n    <key>powerOfTwo</key><{} />\n    <key>premultipliedAlpha</key><{} />\n{}",
        xml_escape(&meta.app),
        xml_escape(&meta.version),
        xml_escape(&meta.format),
        if meta.allow_rotation { "true" } else { "false" },
        if meta.power_of_two { "true" } else { "false" },
        if meta.format.ends_with("PREMULTIPLIED") { "true" } else { "false" },
        images_xml
    ));
    if single {
        if let Some(p0) = atlas.sheet(0) {
            s.push_str(&format!(
                "    <key>size</key><string>{{{}, {}}}</string>\n",
                p0.width(),
                p0.height()
            ));
        }
    }
    s.push_str("  </dict>\n</dict>\n</plist>\n");
    s
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
