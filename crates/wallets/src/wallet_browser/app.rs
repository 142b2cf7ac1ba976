pub(crate) mod contents {
    /// Replaced with the server's session token when the page is served.
    pub(crate) const TOKEN_PLACEHOLDER: &str = "__SESSION_TOKEN__";

    pub(crate) const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Bridge dapp wallet</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; color: #222; }
    code { background: #f3f3f3; padding: 0 .25rem; }
    #log { font-family: monospace; font-size: .85rem; white-space: pre-wrap; color: #555; }
  </style>
</head>
<body>
  <h1>Bridge dapp wallet</h1>
  <p id="status">Looking for a wallet...</p>
  <p>Keep this tab open while the dapp is running.</p>
  <div id="log"></div>
  <script>
    const TOKEN = "__SESSION_TOKEN__";
    const POLL_MS = 500;
    const eth = window.ethereum;

    const statusEl = document.getElementById("status");
    const logEl = document.getElementById("log");
    const log = (msg) => { logEl.textContent = `${new Date().toLocaleTimeString()} ${msg}\n` + logEl.textContent; };

    async function api(method, path, body) {
      const res = await fetch(`/api${path}`, {
        method,
        headers: { "Content-Type": "application/json", "X-Session-Token": TOKEN },
        body: body === undefined ? undefined : JSON.stringify(body),
      });
      return res.json();
    }

    const rpcError = (err) => ({
      code: typeof err.code === "number" ? err.code : -32603,
      message: err.message || String(err),
      data: err.data === undefined ? null : err.data,
    });

    async function currentConnection(accounts) {
      const chainId = await eth.request({ method: "eth_chainId" });
      return { address: accounts[0] || null, chain_id: parseInt(chainId, 16) };
    }

    async function reportConnection(accounts) {
      const connection = await currentConnection(accounts);
      statusEl.textContent = connection.address
        ? `Connected ${connection.address} on chain ${connection.chain_id}`
        : "Wallet locked or no account selected";
      await api("POST", "/connection", connection);
    }

    async function handleAccountsRequest() {
      const pending = await api("GET", "/accounts/request");
      if (pending.status !== "ok") return;
      log("account access requested");
      try {
        const accounts = await eth.request({ method: "eth_requestAccounts" });
        await reportConnection(accounts);
      } catch (err) {
        log(`account request failed: ${err.message}`);
        await api("POST", "/connection", { error: rpcError(err) });
      }
    }

    function walletTransaction(tx) {
      const out = {};
      for (const [key, value] of Object.entries(tx)) {
        if (value === null || value === undefined || key === "id") continue;
        out[key === "input" ? "data" : key] = value;
      }
      return out;
    }

    async function waitForReceipt(hash) {
      for (;;) {
        const receipt = await eth.request({ method: "eth_getTransactionReceipt", params: [hash] });
        if (receipt) {
          return {
            transaction_hash: receipt.transactionHash,
            block_number: receipt.blockNumber ? parseInt(receipt.blockNumber, 16) : null,
            status: receipt.status === "0x1",
          };
        }
        await new Promise((resolve) => setTimeout(resolve, 2 * POLL_MS));
      }
    }

    async function handleTransactionRequest() {
      const pending = await api("GET", "/transaction/request");
      if (pending.status !== "ok") return;
      const tx = pending.data;
      log(`sending transaction ${tx.id}`);
      let hash;
      try {
        hash = await eth.request({ method: "eth_sendTransaction", params: [walletTransaction(tx)] });
      } catch (err) {
        log(`transaction ${tx.id} failed: ${err.message}`);
        await api("POST", "/transaction/response", { id: tx.id, error: rpcError(err) });
        return;
      }
      await api("POST", "/transaction/response", { id: tx.id, hash });
      log(`transaction ${hash} broadcast`);
      // Mining runs alongside polling so account requests are still served.
      trackReceipt(tx.id, hash).catch((err) => log(err.message));
    }

    async function trackReceipt(id, hash) {
      try {
        const receipt = await waitForReceipt(hash);
        await api("POST", "/transaction/response", { id, receipt });
        log(`transaction ${hash} mined`);
      } catch (err) {
        await api("POST", "/transaction/response", { id, error: rpcError(err) });
      }
    }

    async function poll() {
      try {
        await handleAccountsRequest();
        await handleTransactionRequest();
      } catch (err) {
        statusEl.textContent = `Lost contact with the dapp: ${err.message}`;
      }
      setTimeout(poll, POLL_MS);
    }

    async function main() {
      await api("POST", "/wallet", { detected: Boolean(eth) });
      if (!eth) {
        statusEl.textContent = "No Ethereum wallet detected. Install MetaMask and reload this page.";
        return;
      }
      statusEl.textContent = "Wallet detected, waiting for the dapp to connect.";
      eth.on("accountsChanged", (accounts) => {
        log("accountsChanged");
        reportConnection(accounts).catch((err) => log(err.message));
      });
      eth.on("chainChanged", () => {
        log("chainChanged");
        eth.request({ method: "eth_accounts" })
          .then(reportConnection)
          .catch((err) => log(err.message));
      });
      poll();
    }

    main();
  </script>
</body>
</html>
"#;

}
