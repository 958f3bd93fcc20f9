pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Nearby Aid: Register</title>
</head>
<body>
  <main>
    <h1>Register for support</h1>
    <form method="post" action="/register">
      <label>Full name <input name="full_name" required></label>
      <label>Email <input name="email" type="email"></label>
      <label>Phone <input name="phone" type="tel"></label>
      <label>Address <input name="address"></label>
      <label>City <input name="city"></label>
      <label>Country <input name="country"></label>
      <label>Disability type <input name="disability_type"></label>
      <label>Support needs <textarea name="support_needs"></textarea></label>
      <input type="hidden" id="latitude" name="latitude">
      <input type="hidden" id="longitude" name="longitude">
      <button type="button" id="use-location-btn">Use my location</button>
      <p id="location-status" aria-live="polite"></p>
      <button type="submit">Register</button>
    </form>
  </main>
  <script src="/app.js"></script>
</body>
</html>
"#;

pub const APP_JS: &str = r#"document.addEventListener("DOMContentLoaded", () => {
  const button = document.getElementById("use-location-btn");
  const status = document.getElementById("location-status");
  const lat = document.getElementById("latitude");
  const lon = document.getElementById("longitude");
  if (!button || !status || !lat || !lon) return;

  if (!("geolocation" in navigator)) {
    status.textContent = "Location detection is not available; enter an address instead.";
    button.disabled = true;
    return;
  }

  button.addEventListener("click", () => {
    status.textContent = "Locating…";
    navigator.geolocation.getCurrentPosition(
      (pos) => {
        lat.value = String(pos.coords.latitude);
        lon.value = String(pos.coords.longitude);
        status.textContent = "Location captured.";
      },
      () => {
        status.textContent = "Could not read your location; the address will be used instead.";
      },
      { enableHighAccuracy: true, timeout: 10000, maximumAge: 60000 }
    );
  });
});
"#;
