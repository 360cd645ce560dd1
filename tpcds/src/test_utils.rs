use std::path::Path;

use crate::generator::DSDGEN_BINARY;

/// Stand-in for `dsdgen`: each child writes two `reason` rows and two
/// `store_sales` rows, the second of which has no sold date.
pub const FAKE_DSDGEN: &str = r#"#!/bin/sh
parallel=1
child=1
while [ $# -gt 0 ]; do
  case "$1" in
    -DIR) dir="$2"; shift 2 ;;
    -CHILD) child="$2"; shift 2 ;;
    -PARALLEL) parallel="$2"; shift 2 ;;
    *) shift ;;
  esac
done
if [ "$parallel" -gt 1 ]; then
  suffix="_${child}_${parallel}"
else
  suffix=""
fi
printf '%s|AAAAAAA%s|reason %s\n' "$child" "$child" "$child" > "$dir/reason${suffix}.dat"
printf '%s|AAAAAAB%s|other %s\n' "$((child + 100))" "$child" "$child" >> "$dir/reason${suffix}.dat"
printf '245081%s|100|7|||||||%s|3|1.50|2.00|1.75|0.25|5.25|4.50|6.00|0.10|0.00|5.25|5.35|0.75\n' "$child" "$child" > "$dir/store_sales${suffix}.dat"
printf '|100|8|||||||%s|1|1.50|2.00|1.75|0.25|1.75|1.50|2.00|0.10|0.00|1.75|1.85|0.25\n' "$((child + 100))" >> "$dir/store_sales${suffix}.dat"
"#;

#[cfg(unix)]
pub fn install_fake_dsdgen(dir: &Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(DSDGEN_BINARY);
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
